//! Various vector helpers shared by the stroking code.

use crate::Vector;

/// Rotates 90° clockwise in a y-down coordinate system.
#[inline]
pub fn rotate_cw(v: Vector) -> Vector {
    Vector::new(-v.y, v.x)
}

/// Rotates 90° counter-clockwise in a y-down coordinate system.
#[inline]
pub fn rotate_ccw(v: Vector) -> Vector {
    Vector::new(v.y, -v.x)
}

/// Scales `v` to the given length. Fails (returns `None`) when the vector
/// is too short to carry a direction; the magnitude is computed in double
/// precision so very large and very small components survive the square.
pub fn set_length(v: Vector, length: f32) -> Option<Vector> {
    let mag2 = v.x as f64 * v.x as f64 + v.y as f64 * v.y as f64;
    let mag = mag2.sqrt();
    if !(mag > f64::from(f32::MIN_POSITIVE)) {
        return None;
    }
    let scale = (length as f64 / mag) as f32;
    let out = Vector::new(v.x * scale, v.y * scale);
    if !out.x.is_finite() || !out.y.is_finite() {
        return None;
    }
    Some(out)
}

/// Unit vector in `v`'s direction, or `None` when the length underflows.
#[inline]
pub fn normalize(v: Vector) -> Option<Vector> {
    set_length(v, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector;

    #[test]
    fn normalize_rejects_degenerate_vectors() {
        assert!(normalize(vector(0.0, 0.0)).is_none());
        assert!(normalize(vector(1e-40, 0.0)).is_none());
        let n = normalize(vector(3.0, 4.0)).unwrap();
        assert!((n.x - 0.6).abs() < 1e-6);
        assert!((n.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn rotations_are_quarter_turns() {
        let v = vector(1.0, 0.0);
        assert_eq!(rotate_cw(v), vector(0.0, 1.0));
        assert_eq!(rotate_ccw(v), vector(0.0, -1.0));
        assert_eq!(rotate_cw(rotate_ccw(v)), v);
    }
}

//! Single precision scalar helpers shared by the curve types.

/// Tolerance below which two scalars are considered equal.
///
/// 1/4096 is about the precision a path coordinate retains after a couple of
/// transforms, and matches what the rest of the workspace assumes.
pub const NEARLY_ZERO: f32 = 1.0 / 4096.0;

/// `√2 / 2`, the conic weight of a quarter circle.
pub const ROOT_2_OVER_2: f32 = 0.707106781;

#[inline]
pub fn nearly_zero(x: f32) -> bool {
    x.abs() <= NEARLY_ZERO
}

#[inline]
pub fn nearly_equal(a: f32, b: f32) -> bool {
    (a - b).abs() <= NEARLY_ZERO
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn interp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// `true` for every value that is neither NaN nor infinite.
///
/// Multiplying by zero collapses any finite value to zero while infinities
/// and NaN stay non-finite, which lets us test a whole slice with a single
/// accumulator instead of one branch per float.
#[inline]
pub fn are_finite(values: &[f32]) -> bool {
    let mut prod = 0.0;
    for v in values {
        prod *= v;
    }
    prod == 0.0
}

/// Returns `t = numer / denom` only when it lands strictly inside (0, 1).
pub(crate) fn valid_unit_divide(mut numer: f32, mut denom: f32) -> Option<f32> {
    if numer < 0.0 {
        numer = -numer;
        denom = -denom;
    }
    if denom == 0.0 || numer == 0.0 || numer >= denom {
        return None;
    }
    let r = numer / denom;
    if r.is_nan() || r == 0.0 {
        return None;
    }
    Some(r)
}

/// Solves `A·t² + B·t + C = 0`, keeping only roots strictly inside (0, 1).
///
/// The returned roots are sorted and deduplicated. Uses the numerically
/// stable form `q = -(B ± √discr) / 2`, promoting the discriminant to f64
/// so that nearly-tangent curves do not lose their roots to cancellation.
pub fn find_unit_quad_roots(a: f32, b: f32, c: f32) -> arrayvec::ArrayVec<f32, 2> {
    let mut roots = arrayvec::ArrayVec::new();

    if a == 0.0 {
        if let Some(t) = valid_unit_divide(-c, b) {
            roots.push(t);
        }
        return roots;
    }

    let dr = b as f64 * b as f64 - 4.0 * a as f64 * c as f64;
    if dr < 0.0 {
        return roots;
    }
    let dr = dr.sqrt() as f32;
    if !dr.is_finite() {
        return roots;
    }

    let q = if b < 0.0 { -(b - dr) / 2.0 } else { -(b + dr) / 2.0 };
    if let Some(t) = valid_unit_divide(q, a) {
        roots.push(t);
    }
    if let Some(t) = valid_unit_divide(c, q) {
        roots.push(t);
    }

    if roots.len() == 2 {
        if roots[0] > roots[1] {
            roots.swap(0, 1);
        } else if roots[0] == roots[1] {
            roots.pop();
        }
    }

    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_slices() {
        assert!(are_finite(&[0.0, 1.0, -5.25, 1e30]));
        assert!(!are_finite(&[0.0, f32::NAN]));
        assert!(!are_finite(&[f32::INFINITY, 1.0]));
        assert!(!are_finite(&[1.0, f32::NEG_INFINITY]));
        assert!(are_finite(&[]));
    }

    #[test]
    fn quad_roots_in_unit_range() {
        // (t - 0.25)(t - 0.75) = t² - t + 3/16
        let roots = find_unit_quad_roots(1.0, -1.0, 3.0 / 16.0);
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 0.25).abs() < 1e-6);
        assert!((roots[1] - 0.75).abs() < 1e-6);

        // Roots at 0 and 1 are excluded.
        assert!(find_unit_quad_roots(1.0, -1.0, 0.0).is_empty());

        // Linear case.
        let roots = find_unit_quad_roots(0.0, 2.0, -1.0);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 0.5).abs() < 1e-6);
    }
}

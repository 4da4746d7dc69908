//! 3×3 transformation matrix.
//!
//! Stores the full projective matrix
//!
//! ```text
//!   | sx  kx  tx |
//!   | ky  sy  ty |
//!   | px  py  pw |
//! ```
//!
//! with an explicit flag recording whether the bottom row differs from
//! `(0, 0, 1)`. Affine transforms map `x' = x·sx + y·kx + tx`,
//! `y' = x·ky + y·sy + ty`; with perspective the result is further divided
//! by `x·px + y·py + pw`.

use crate::{point, Box2D, Point, Vector};

/// 3×3 transform with an explicit perspective flag.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Matrix {
    pub sx: f32,
    pub kx: f32,
    pub tx: f32,
    pub ky: f32,
    pub sy: f32,
    pub ty: f32,
    pub px: f32,
    pub py: f32,
    pub pw: f32,
    perspective: bool,
}

impl Matrix {
    pub fn identity() -> Self {
        Matrix::row_major(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0)
    }

    /// All nine entries, row by row.
    #[allow(clippy::too_many_arguments)]
    pub fn row_major(
        sx: f32,
        kx: f32,
        tx: f32,
        ky: f32,
        sy: f32,
        ty: f32,
        px: f32,
        py: f32,
        pw: f32,
    ) -> Self {
        Matrix {
            sx,
            kx,
            tx,
            ky,
            sy,
            ty,
            px,
            py,
            pw,
            perspective: px != 0.0 || py != 0.0 || pw != 1.0,
        }
    }

    pub fn translation(dx: f32, dy: f32) -> Self {
        Matrix::row_major(1.0, 0.0, dx, 0.0, 1.0, dy, 0.0, 0.0, 1.0)
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Matrix::row_major(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0)
    }

    /// Counter-clockwise rotation (in the y-up convention) by `radians`.
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Matrix::row_major(cos, -sin, 0.0, sin, cos, 0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub fn has_perspective(&self) -> bool {
        self.perspective
    }

    pub fn is_identity(&self) -> bool {
        *self == Matrix::identity()
    }

    /// No rotation or skew: only scale and translation components.
    #[inline]
    pub fn is_scale_translate(&self) -> bool {
        !self.perspective && self.kx == 0.0 && self.ky == 0.0
    }

    /// Whether the matrix maps axis-aligned rectangles onto axis-aligned
    /// rectangles: either a scale (possibly flipped) or a swap of the axes,
    /// with both mapped axes non-degenerate.
    pub fn rect_stays_rect(&self) -> bool {
        if self.perspective {
            return false;
        }
        if self.kx == 0.0 && self.ky == 0.0 {
            self.sx != 0.0 && self.sy != 0.0
        } else if self.sx == 0.0 && self.sy == 0.0 {
            self.kx != 0.0 && self.ky != 0.0
        } else {
            false
        }
    }

    /// Determinant of the 2×2 linear block. Its sign tells whether the
    /// transform preserves or reverses winding.
    #[inline]
    pub fn det_2x2(&self) -> f32 {
        self.sx * self.sy - self.kx * self.ky
    }

    pub fn map_point(&self, p: Point) -> Point {
        let x = p.x * self.sx + p.y * self.kx + self.tx;
        let y = p.x * self.ky + p.y * self.sy + self.ty;
        if !self.perspective {
            return point(x, y);
        }
        let z = p.x * self.px + p.y * self.py + self.pw;
        if z == 0.0 {
            return point(x, y);
        }
        point(x / z, y / z)
    }

    /// Transforms a direction; translation does not apply. Perspective
    /// matrices do not map vectors uniformly, so this uses the linear block
    /// only.
    pub fn map_vector(&self, v: Vector) -> Vector {
        Vector::new(v.x * self.sx + v.y * self.kx, v.x * self.ky + v.y * self.sy)
    }

    /// Maps the four corners and returns their bounding box.
    ///
    /// For `rect_stays_rect()` matrices this is exact; otherwise it is the
    /// bounds of the transformed corners.
    pub fn map_box(&self, r: &Box2D) -> Box2D {
        let corners = [
            self.map_point(r.min),
            self.map_point(point(r.max.x, r.min.y)),
            self.map_point(r.max),
            self.map_point(point(r.min.x, r.max.y)),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        Box2D { min, max }
    }

    /// The z coordinate of a transformed homogeneous point; used by the
    /// conic weight transform.
    #[inline]
    pub fn map_homogeneous_z(&self, x: f32, y: f32, z: f32) -> f32 {
        x * self.px + y * self.py + z * self.pw
    }

    /// `self` followed by `next` (`next · self` in matrix notation).
    pub fn then(&self, next: &Matrix) -> Matrix {
        let a = next;
        let b = self;
        Matrix::row_major(
            a.sx * b.sx + a.kx * b.ky + a.tx * b.px,
            a.sx * b.kx + a.kx * b.sy + a.tx * b.py,
            a.sx * b.tx + a.kx * b.ty + a.tx * b.pw,
            a.ky * b.sx + a.sy * b.ky + a.ty * b.px,
            a.ky * b.kx + a.sy * b.sy + a.ty * b.py,
            a.ky * b.tx + a.sy * b.ty + a.ty * b.pw,
            a.px * b.sx + a.py * b.ky + a.pw * b.px,
            a.px * b.kx + a.py * b.sy + a.pw * b.py,
            a.px * b.tx + a.py * b.ty + a.pw * b.pw,
        )
    }

    /// Inverse of an affine matrix. `None` for perspective or singular
    /// matrices.
    pub fn inverse(&self) -> Option<Matrix> {
        if self.perspective {
            return None;
        }
        let det = self.det_2x2();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let sx = self.sy * inv_det;
        let kx = -self.kx * inv_det;
        let ky = -self.ky * inv_det;
        let sy = self.sx * inv_det;
        Some(Matrix::row_major(
            sx,
            kx,
            -(sx * self.tx + kx * self.ty),
            ky,
            sy,
            -(ky * self.tx + sy * self.ty),
            0.0,
            0.0,
            1.0,
        ))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Matrix::identity().is_identity());
        assert!(Matrix::scale(2.0, 3.0).is_scale_translate());
        assert!(Matrix::scale(2.0, 3.0).rect_stays_rect());
        assert!(!Matrix::scale(2.0, 0.0).rect_stays_rect());
        assert!(!Matrix::rotation(0.3).is_scale_translate());

        // A quarter turn swaps the axes and still maps rects to rects.
        let quarter = Matrix::row_major(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        assert!(quarter.rect_stays_rect());

        let persp = Matrix::row_major(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.001, 0.0, 1.0);
        assert!(persp.has_perspective());
        assert!(!persp.rect_stays_rect());
    }

    #[test]
    fn map_and_invert() {
        let m = Matrix::translation(10.0, -4.0).then(&Matrix::scale(2.0, 2.0));
        let p = point(1.0, 1.0);
        let q = m.map_point(p);
        assert_eq!(q, point(22.0, -6.0));
        let inv = m.inverse().unwrap();
        assert!((inv.map_point(q) - p).length() < 1e-5);
    }

    #[test]
    fn perspective_divides() {
        let m = Matrix::row_major(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0);
        assert!(m.has_perspective());
        assert_eq!(m.map_point(point(4.0, 6.0)), point(2.0, 3.0));
    }

    #[test]
    fn winding_sign() {
        assert!(Matrix::scale(2.0, 3.0).det_2x2() > 0.0);
        assert!(Matrix::scale(-2.0, 3.0).det_2x2() < 0.0);
        assert!(Matrix::rotation(1.0).det_2x2() > 0.0);
    }
}

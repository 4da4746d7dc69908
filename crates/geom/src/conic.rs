//! Rational quadratic (conic) curve segments.
//!
//! A conic is a quadratic bézier whose control point carries a weight `w`:
//!
//! `P(t) = ((1-t)²·from + 2t(1-t)·w·ctrl + t²·to) / ((1-t)² + 2t(1-t)·w + t²)`
//!
//! `w == 1` is an ordinary quadratic; as `w` grows the curve hugs the control
//! polygon, degenerating into a pair of lines in the limit. A weight of
//! `√2/2` traces an exact quarter circle, which is how ovals and rounded
//! rectangles are stored.

use crate::scalar::{find_unit_quad_roots, interp};
use crate::{point, Matrix, Point, QuadraticBezierSegment, Vector};

use core::ops::Range;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ConicSegment {
    pub from: Point,
    pub ctrl: Point,
    pub to: Point,
    pub w: f32,
}

// Homogeneous representation used by the projective split: the control
// point is lifted to (x·w, y·w, w) while the endpoints stay at z = 1.
#[derive(Copy, Clone)]
struct HomPoint {
    x: f32,
    y: f32,
    z: f32,
}

impl HomPoint {
    fn lerp(self, other: HomPoint, t: f32) -> HomPoint {
        HomPoint {
            x: interp(self.x, other.x, t),
            y: interp(self.y, other.y, t),
            z: interp(self.z, other.z, t),
        }
    }

    fn project(self) -> Point {
        point(self.x / self.z, self.y / self.z)
    }
}

impl ConicSegment {
    fn to_homogeneous(self) -> [HomPoint; 3] {
        [
            HomPoint {
                x: self.from.x,
                y: self.from.y,
                z: 1.0,
            },
            HomPoint {
                x: self.ctrl.x * self.w,
                y: self.ctrl.y * self.w,
                z: self.w,
            },
            HomPoint {
                x: self.to.x,
                y: self.to.y,
                z: 1.0,
            },
        ]
    }

    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: f32) -> Point {
        point(
            eval_numerator(self.from.x, self.ctrl.x, self.to.x, self.w, t)
                / eval_denominator(self.w, t),
            eval_numerator(self.from.y, self.ctrl.y, self.to.y, self.w, t)
                / eval_denominator(self.w, t),
        )
    }

    /// A non-zero tangent direction at t.
    pub fn tangent(&self, t: f32) -> Vector {
        // The derivative returns a zero vector when t is 0 or 1 and the
        // control point coincides with that endpoint; fall back to the chord.
        if (t == 0.0 && self.from == self.ctrl) || (t == 1.0 && self.ctrl == self.to) {
            return self.to - self.from;
        }
        let p20 = self.to - self.from;
        let p10 = self.ctrl - self.from;

        let c = p10 * self.w;
        let a = p20 * self.w - p20;
        let b = p20 - c - c;
        (a * t + b) * t + c
    }

    /// Swap the beginning and the end of the segment.
    pub fn flip(&self) -> Self {
        ConicSegment {
            from: self.to,
            ctrl: self.ctrl,
            to: self.from,
            w: self.w,
        }
    }

    /// Split the conic in half, producing two conics in standard form.
    ///
    /// The optimized non-projective formulation only holds for the midpoint;
    /// arbitrary parameters go through [`split`](Self::split).
    pub fn split_in_half(&self) -> (ConicSegment, ConicSegment) {
        let scale = 1.0 / (1.0 + self.w);
        let new_w = subdivided_weight(self.w);

        let p0 = self.from.to_vector();
        let p2 = self.to.to_vector();
        let wp1 = self.ctrl.to_vector() * self.w;
        let mid = ((p0 + wp1 * 2.0 + p2) * scale * 0.5).to_point();

        (
            ConicSegment {
                from: self.from,
                ctrl: ((p0 + wp1) * scale).to_point(),
                to: mid,
                w: new_w,
            },
            ConicSegment {
                from: mid,
                ctrl: ((wp1 + p2) * scale).to_point(),
                to: self.to,
                w: new_w,
            },
        )
    }

    /// Split at an arbitrary parameter.
    ///
    /// Interpolates in homogeneous space and renormalizes so both halves
    /// keep unit weights on their endpoints. Returns `None` when the
    /// projection overflows (enormous coordinates).
    pub fn split(&self, t: f32) -> Option<(ConicSegment, ConicSegment)> {
        let src = self.to_homogeneous();
        let ab = src[0].lerp(src[1], t);
        let bc = src[1].lerp(src[2], t);
        let abc = ab.lerp(bc, t);

        let mid = abc.project();
        if !mid.x.is_finite() || !mid.y.is_finite() {
            return None;
        }

        let root = abc.z.sqrt();
        Some((
            ConicSegment {
                from: self.from,
                ctrl: ab.project(),
                to: mid,
                w: ab.z / root,
            },
            ConicSegment {
                from: mid,
                ctrl: bc.project(),
                to: self.to,
                w: bc.z / root,
            },
        ))
    }

    /// Return the sub-curve inside a given range of t.
    ///
    /// The result is a conic in standard form; its weight generally differs
    /// from the source weight.
    pub fn split_range(&self, t_range: Range<f32>) -> Option<ConicSegment> {
        let (t0, t1) = (t_range.start, t_range.end);
        let mut sub = *self;
        if t0 > 0.0 {
            sub = sub.split(t0)?.1;
        }
        if t1 < 1.0 {
            let local = (t1 - t0) / (1.0 - t0);
            sub = sub.split(local)?.0;
        }
        Some(sub)
    }

    /// Parameter of the curve's local y extremum, if any.
    pub fn local_y_extremum_t(&self) -> Option<f32> {
        let a = self.from.y;
        let b = self.ctrl.y;
        let c = self.to.y;
        let roots = find_unit_quad_roots(
            (self.w - 1.0) * (c - a),
            c - a - 2.0 * self.w * (b - a),
            self.w * (b - a),
        );
        roots.first().copied()
    }

    /// Whether y(t) is monotonic over the whole parameter range.
    pub fn is_y_monotonic(&self) -> bool {
        let (y0, y1, y2) = (self.from.y, self.ctrl.y, self.to.y);
        if y0 == y1 {
            return true;
        }
        if y0 < y1 {
            y1 <= y2
        } else {
            y1 >= y2
        }
    }

    /// Chop into two y-monotonic conics.
    ///
    /// Returns `None` when the conic is already monotonic or when very large
    /// coordinates defeat the projective split; callers treat that case as
    /// monotonic.
    pub fn chop_at_y_extrema(&self) -> Option<(ConicSegment, ConicSegment)> {
        let t = self.local_y_extremum_t()?;
        let (mut a, mut b) = self.split(t)?;
        // Pin the split point as a flat extremum.
        let y = a.to.y;
        a.ctrl.y = y;
        b.ctrl.y = y;
        Some((a, b))
    }

    /// Approximate the conic with `2^pow2` quadratic béziers.
    ///
    /// Subdivides in half recursively; each leaf conic's control polygon is
    /// taken as-is for the quad, which is accurate once the weights are
    /// close to one.
    pub fn to_quads(&self, pow2: u8, quads: &mut Vec<QuadraticBezierSegment>) {
        fn subdivide(conic: &ConicSegment, level: u8, quads: &mut Vec<QuadraticBezierSegment>) {
            if level == 0 {
                quads.push(QuadraticBezierSegment {
                    from: conic.from,
                    ctrl: conic.ctrl,
                    to: conic.to,
                });
            } else {
                let (a, b) = conic.split_in_half();
                subdivide(&a, level - 1, quads);
                subdivide(&b, level - 1, quads);
            }
        }
        subdivide(self, pow2.min(5), quads);
    }

    /// The weight the conic keeps when a matrix with perspective is applied
    /// to its points.
    ///
    /// Without perspective the weight is unchanged. Under perspective the
    /// three homogeneous z's are remapped and the standard-form weight is
    /// `√(z1² / (z0·z2))`.
    pub fn transformed_weight(&self, matrix: &Matrix) -> f32 {
        if !matrix.has_perspective() {
            return self.w;
        }
        let src = self.to_homogeneous();
        let mut z = [0.0f32; 3];
        for (i, p) in src.iter().enumerate() {
            z[i] = matrix.map_homogeneous_z(p.x, p.y, p.z);
        }
        ((z[1] * z[1]) / (z[0] * z[2])).sqrt()
    }
}

/// Weight of both halves after splitting a conic of weight `w` in half.
#[inline]
pub fn subdivided_weight(w: f32) -> f32 {
    (0.5 + w * 0.5).sqrt()
}

/// Which way an arc sweeps, in y-down coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum RotationDirection {
    Cw,
    Ccw,
}

/// Builds the arc of a unit circle sweeping from the unit vector `u_start`
/// to `u_stop` in the given direction, as up to five conic quarter arcs,
/// then maps them through `user_matrix`.
///
/// Returns an empty list for an (effectively) zero sweep.
pub fn build_unit_arc(
    u_start: Vector,
    u_stop: Vector,
    dir: RotationDirection,
    user_matrix: &Matrix,
    dst: &mut arrayvec::ArrayVec<ConicSegment, 5>,
) {
    use crate::scalar::{nearly_equal, NEARLY_ZERO, ROOT_2_OVER_2};
    use crate::utils::set_length;

    dst.clear();

    // Rotate so u_start maps onto (1, 0); the sweep then ends at (x, y).
    let x = u_start.dot(u_stop);
    let mut y = u_start.cross(u_stop);

    let abs_y = y.abs();

    // A nearly-zero sweep (angle close to 0 or, distinguished by the dot
    // product's sign, to 360) produces no geometry.
    if abs_y <= NEARLY_ZERO
        && x > 0.0
        && ((y >= 0.0 && dir == RotationDirection::Cw) || (y <= 0.0 && dir == RotationDirection::Ccw))
    {
        return;
    }

    if dir == RotationDirection::Ccw {
        y = -y;
    }

    // How many full quadrants does the sweep cross?
    let quadrant = if y == 0.0 {
        2 // 180°
    } else if x == 0.0 {
        if y > 0.0 {
            1
        } else {
            3
        }
    } else {
        let mut q = 0;
        if y < 0.0 {
            q += 2;
        }
        if (x < 0.0) != (y < 0.0) {
            q += 1;
        }
        q
    };

    const QUADRANT_PTS: [(f32, f32); 8] = [
        (1.0, 0.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (-1.0, 1.0),
        (-1.0, 0.0),
        (-1.0, -1.0),
        (0.0, -1.0),
        (1.0, -1.0),
    ];

    let quad_pt = |i: usize| {
        let (px, py) = QUADRANT_PTS[i % 8];
        point(px, py)
    };
    for i in 0..quadrant {
        dst.push(ConicSegment {
            from: quad_pt(i * 2),
            ctrl: quad_pt(i * 2 + 1),
            to: quad_pt(i * 2 + 2),
            w: ROOT_2_OVER_2,
        });
    }

    // The remaining sub-90° wedge.
    let final_pt = point(x, y);
    let last_q = quad_pt(quadrant * 2);
    let dot = last_q.to_vector().dot(final_pt.to_vector());
    if dot < 1.0 {
        let off_curve = Vector::new(last_q.x + x, last_q.y + y);
        // The off-curve point sits on the bisector at 1/cos(θ/2), which
        // (half-angle identity) is also the conic weight for the wedge.
        let cos_theta_over_2 = ((1.0 + dot) / 2.0).sqrt();
        if let Some(off_curve) = set_length(off_curve, 1.0 / cos_theta_over_2) {
            let off_pt = off_curve.to_point();
            if !(nearly_equal(last_q.x, off_pt.x) && nearly_equal(last_q.y, off_pt.y)) {
                dst.push(ConicSegment {
                    from: last_q,
                    ctrl: off_pt,
                    to: final_pt,
                    w: cos_theta_over_2,
                });
            }
        }
    }

    // Undo the initial rotation, flip for counter-clockwise sweeps, then
    // apply the caller's transform.
    let mut matrix = Matrix::row_major(
        u_start.x, -u_start.y, 0.0,
        u_start.y, u_start.x, 0.0,
        0.0, 0.0, 1.0,
    );
    if dir == RotationDirection::Ccw {
        matrix = Matrix::scale(1.0, -1.0).then(&matrix);
    }
    matrix = matrix.then(user_matrix);
    for conic in dst.iter_mut() {
        conic.from = matrix.map_point(conic.from);
        conic.ctrl = matrix.map_point(conic.ctrl);
        conic.to = matrix.map_point(conic.to);
    }
}

pub(crate) fn eval_numerator(p0: f32, p1: f32, p2: f32, w: f32, t: f32) -> f32 {
    let p1w = p1 * w;
    let c = p0;
    let a = p2 - 2.0 * p1w + c;
    let b = 2.0 * (p1w - c);
    (a * t + b) * t + c
}

pub(crate) fn eval_denominator(w: f32, t: f32) -> f32 {
    let b = 2.0 * (w - 1.0);
    let c = 1.0;
    let a = -b;
    (a * t + b) * t + c
}

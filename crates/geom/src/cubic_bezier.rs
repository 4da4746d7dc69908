use crate::scalar::{find_unit_quad_roots, interp};
use crate::{LineSegment, Point, Vector};

use arrayvec::ArrayVec;
use core::ops::Range;

/// A 2d curve segment defined by four points: the beginning of the segment, two control
/// points and the end of the segment.
///
/// The curve is defined by equation:
/// `∀ t ∈ [0..1],  P(t) = (1 - t)³ * from + 3 * (1 - t)² * t * ctrl1 + 3 * t² * (1 - t) * ctrl2 + t³ * to`
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubicBezierSegment {
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
}

// Roots of coeff[0]·t³ + coeff[1]·t² + coeff[2]·t + coeff[3] inside [0, 1],
// by Cardano with the trigonometric three-root branch.
fn solve_cubic_poly(coeff: &[f32; 4]) -> ArrayVec<f32, 3> {
    use crate::scalar::nearly_zero;

    if nearly_zero(coeff[0]) {
        let mut out = ArrayVec::new();
        for t in find_unit_quad_roots(coeff[1], coeff[2], coeff[3]) {
            out.push(t);
        }
        return out;
    }

    let a = coeff[1] / coeff[0];
    let b = coeff[2] / coeff[0];
    let c = coeff[3] / coeff[0];

    let q = (a * a - b * 3.0) / 9.0;
    let r = (2.0 * a * a * a - 9.0 * a * b + 27.0 * c) / 54.0;
    let q3 = q * q * q;
    let r2_minus_q3 = r * r - q3;
    let adiv3 = a / 3.0;

    let mut out: ArrayVec<f32, 3> = ArrayVec::new();
    if r2_minus_q3 < 0.0 {
        // Three real roots.
        let theta = (r as f64 / (q3 as f64).sqrt()).clamp(-1.0, 1.0).acos();
        let neg2_root_q = -2.0 * (q as f64).sqrt();
        let mut push = |t: f64| {
            let t = (t - adiv3 as f64).clamp(0.0, 1.0) as f32;
            if !out.iter().any(|v| *v == t) {
                out.push(t);
            }
        };
        push(neg2_root_q * (theta / 3.0).cos());
        push(neg2_root_q * ((theta + 2.0 * core::f64::consts::PI) / 3.0).cos());
        push(neg2_root_q * ((theta - 2.0 * core::f64::consts::PI) / 3.0).cos());
        out.sort_by(|x, y| x.partial_cmp(y).unwrap());
    } else {
        // One real root.
        let mut big_a = r.abs() + r2_minus_q3.sqrt();
        big_a = big_a.cbrt();
        if r > 0.0 {
            big_a = -big_a;
        }
        if big_a != 0.0 {
            big_a += q / big_a;
        }
        out.push((big_a - adiv3).clamp(0.0, 1.0));
    }
    out
}

/// Evaluates one coordinate of the curve given its four polyline values.
pub(crate) fn eval_cubic_coords(c0: f32, c1: f32, c2: f32, c3: f32, t: f32) -> f32 {
    let a = c3 + 3.0 * (c1 - c2) - c0;
    let b = 3.0 * (c2 - c1 - c1 + c0);
    let c = 3.0 * (c1 - c0);
    ((a * t + b) * t + c) * t + c0
}

impl CubicBezierSegment {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: f32) -> Point {
        Point::new(
            eval_cubic_coords(self.from.x, self.ctrl1.x, self.ctrl2.x, self.to.x, t),
            eval_cubic_coords(self.from.y, self.ctrl1.y, self.ctrl2.y, self.to.y, t),
        )
    }

    /// Sample the x coordinate of the curve at t.
    pub fn x(&self, t: f32) -> f32 {
        eval_cubic_coords(self.from.x, self.ctrl1.x, self.ctrl2.x, self.to.x, t)
    }

    /// Sample the y coordinate of the curve at t.
    pub fn y(&self, t: f32) -> f32 {
        eval_cubic_coords(self.from.y, self.ctrl1.y, self.ctrl2.y, self.to.y, t)
    }

    /// Sample the curve's derivative at t.
    pub fn derivative(&self, t: f32) -> Vector {
        let one_t = 1.0 - t;
        (self.ctrl1 - self.from) * 3.0 * one_t * one_t
            + (self.ctrl2 - self.ctrl1) * 6.0 * one_t * t
            + (self.to - self.ctrl2) * 3.0 * t * t
    }

    /// A non-zero tangent direction at t.
    ///
    /// When the derivative vanishes (coincident control points at an
    /// endpoint, or a cusp) this walks to the next control polygon edge,
    /// ending with the chord.
    pub fn tangent(&self, t: f32) -> Vector {
        let d = self.derivative(t);
        if d.square_length() > 0.0 {
            return d;
        }
        if t == 0.0 {
            let v = self.ctrl2 - self.from;
            if v.square_length() > 0.0 {
                return v;
            }
        } else if t == 1.0 {
            let v = self.to - self.ctrl1;
            if v.square_length() > 0.0 {
                return v;
            }
        }
        self.to - self.from
    }

    /// Swap the beginning and the end of the segment.
    pub fn flip(&self) -> Self {
        CubicBezierSegment {
            from: self.to,
            ctrl1: self.ctrl2,
            ctrl2: self.ctrl1,
            to: self.from,
        }
    }

    #[inline]
    pub fn baseline(&self) -> LineSegment {
        LineSegment {
            from: self.from,
            to: self.to,
        }
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: f32) -> (CubicBezierSegment, CubicBezierSegment) {
        let ab = self.from.lerp(self.ctrl1, t);
        let bc = self.ctrl1.lerp(self.ctrl2, t);
        let cd = self.ctrl2.lerp(self.to, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let abcd = abc.lerp(bcd, t);

        (
            CubicBezierSegment {
                from: self.from,
                ctrl1: ab,
                ctrl2: abc,
                to: abcd,
            },
            CubicBezierSegment {
                from: abcd,
                ctrl1: bcd,
                ctrl2: cd,
                to: self.to,
            },
        )
    }

    /// Return the sub-curve inside a given range of t.
    pub fn split_range(&self, t_range: Range<f32>) -> Self {
        let (t0, t1) = (t_range.start, t_range.end);
        if t0 == 0.0 {
            return self.split(t1).0;
        }
        let after = self.split(t0).1;
        if t1 == 1.0 {
            return after;
        }
        after.split((t1 - t0) / (1.0 - t0)).0
    }

    /// Parameters of the curve's local y extrema, if any.
    pub fn local_y_extrema(&self) -> ArrayVec<f32, 2> {
        let (y0, y1, y2, y3) = (self.from.y, self.ctrl1.y, self.ctrl2.y, self.to.y);
        // Roots of the derivative, which is a quadratic in t.
        find_unit_quad_roots(
            y3 - y0 + 3.0 * (y1 - y2),
            2.0 * (y0 - y1 - y1 + y2),
            y1 - y0,
        )
    }

    /// Chop into y-monotonic sub-curves (one to three of them).
    pub fn chop_at_y_extrema(&self) -> ArrayVec<CubicBezierSegment, 3> {
        let mut out = ArrayVec::new();
        let roots = self.local_y_extrema();

        let mut rest = *self;
        let mut t_prev = 0.0;
        for &t in roots.iter() {
            let local = (t - t_prev) / (1.0 - t_prev);
            let (mut a, mut b) = rest.split(local);
            // Pin the split point as a flat extremum.
            a.ctrl2.y = a.to.y;
            b.ctrl1.y = b.from.y;
            out.push(a);
            rest = b;
            t_prev = t;
        }
        out.push(rest);
        out
    }

    /// Inflection parameters in (0, 1), where the curvature changes sign.
    pub fn inflections(&self) -> ArrayVec<f32, 2> {
        let a = self.ctrl1 - self.from;
        let b = self.ctrl2.to_vector() - self.ctrl1.to_vector() * 2.0 + self.from.to_vector();
        let c = self.to.to_vector() + (self.ctrl1.to_vector() - self.ctrl2.to_vector()) * 3.0
            - self.from.to_vector();

        find_unit_quad_roots(
            b.x * c.y - b.y * c.x,
            a.x * c.y - a.y * c.x,
            a.x * b.y - a.y * b.x,
        )
    }

    /// Parameters of maximum curvature, up to three of them, in [0, 1].
    pub fn max_curvature(&self) -> ArrayVec<f32, 3> {
        fn formulate_f1_dot_f2(c0: f32, c1: f32, c2: f32, c3: f32) -> [f32; 4] {
            let a = c1 - c0;
            let b = c2 - 2.0 * c1 + c0;
            let c = c3 + 3.0 * (c1 - c2) - c0;
            [c * c, 3.0 * b * c, 2.0 * b * b + c * a, a * b]
        }

        let cx = formulate_f1_dot_f2(self.from.x, self.ctrl1.x, self.ctrl2.x, self.to.x);
        let cy = formulate_f1_dot_f2(self.from.y, self.ctrl1.y, self.ctrl2.y, self.to.y);
        let coeff = [cx[0] + cy[0], cx[1] + cy[1], cx[2] + cy[2], cx[3] + cy[3]];
        solve_cubic_poly(&coeff)
    }

    /// The parameter of a cusp, when the cubic has one: a point of maximum
    /// curvature where the derivative also collapses.
    pub fn cusp_t(&self) -> Option<f32> {
        // An endpoint coincident with its control point cannot form a cusp,
        // and without the control segments crossing there is none either.
        if self.from == self.ctrl1 || self.ctrl2 == self.to {
            return None;
        }
        let on_same_side = |test: (Point, Point), line: (Point, Point)| -> bool {
            let dir = line.1 - line.0;
            let c0 = dir.cross(test.0 - line.0);
            let c1 = dir.cross(test.1 - line.0);
            c0 * c1 >= 0.0
        };
        if on_same_side((self.ctrl2, self.to), (self.from, self.ctrl1))
            || on_same_side((self.from, self.ctrl1), (self.ctrl2, self.to))
        {
            return None;
        }

        // Proportional to the cubic's dimensions; experimentally chosen.
        let precision = ((self.ctrl1 - self.from).square_length()
            + (self.ctrl2 - self.ctrl1).square_length()
            + (self.to - self.ctrl2).square_length())
            * 1e-8;

        for t in self.max_curvature() {
            if t <= 0.0 || t >= 1.0 {
                continue;
            }
            if self.derivative(t).square_length() < precision {
                return Some(t);
            }
        }
        None
    }

    /// Solves `y(t) = y` on a y-monotonic cubic by bisection.
    ///
    /// Returns `None` when `y` is outside the curve's y span.
    pub fn solve_t_for_y_monotonic(&self, y: f32) -> Option<f32> {
        let y0 = self.from.y - y;
        let y1 = self.ctrl1.y - y;
        let y2 = self.ctrl2.y - y;
        let y3 = self.to.y - y;

        let (mut t_neg, mut t_pos);
        if y0 < 0.0 {
            if y3 < 0.0 {
                return None;
            }
            t_neg = 0.0;
            t_pos = 1.0;
        } else if y0 > 0.0 {
            if y3 > 0.0 {
                return None;
            }
            t_neg = 1.0;
            t_pos = 0.0;
        } else {
            return Some(0.0);
        }

        let tol = 1.0 / 65536.0;
        loop {
            let t_mid = (t_pos + t_neg) / 2.0;
            let y01 = interp(y0, y1, t_mid);
            let y12 = interp(y1, y2, t_mid);
            let y23 = interp(y2, y3, t_mid);
            let y012 = interp(y01, y12, t_mid);
            let y123 = interp(y12, y23, t_mid);
            let y0123 = interp(y012, y123, t_mid);
            if y0123 == 0.0 {
                return Some(t_mid);
            }
            if y0123 < 0.0 {
                t_neg = t_mid;
            } else {
                t_pos = t_mid;
            }
            // NaN-safe exit condition.
            if !((t_pos - t_neg).abs() > tol) {
                break;
            }
        }

        Some((t_neg + t_pos) / 2.0)
    }
}

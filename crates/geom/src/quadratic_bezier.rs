use crate::scalar::valid_unit_divide;
use crate::{CubicBezierSegment, LineSegment, Point, Vector};

use core::ops::Range;

/// A 2d curve segment defined by three points: the beginning of the segment, a control
/// point and the end of the segment.
///
/// The curve is defined by equation:
/// `∀ t ∈ [0..1],  P(t) = (1 - t)² * from + 2 * (1 - t) * t * ctrl + t² * to`
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadraticBezierSegment {
    pub from: Point,
    pub ctrl: Point,
    pub to: Point,
}

impl QuadraticBezierSegment {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: f32) -> Point {
        let t2 = t * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;

        self.from * one_t2 + self.ctrl.to_vector() * 2.0 * one_t * t + self.to.to_vector() * t2
    }

    /// Sample the x coordinate of the curve at t.
    pub fn x(&self, t: f32) -> f32 {
        let c = self.from.x;
        let a = self.to.x - 2.0 * self.ctrl.x + c;
        let b = 2.0 * (self.ctrl.x - c);
        (a * t + b) * t + c
    }

    /// Sample the y coordinate of the curve at t.
    pub fn y(&self, t: f32) -> f32 {
        let c = self.from.y;
        let a = self.to.y - 2.0 * self.ctrl.y + c;
        let b = 2.0 * (self.ctrl.y - c);
        (a * t + b) * t + c
    }

    /// Sample the curve's derivative at t.
    pub fn derivative(&self, t: f32) -> Vector {
        (self.ctrl - self.from) * 2.0 * (1.0 - t) + (self.to - self.ctrl) * 2.0 * t
    }

    /// A non-zero tangent direction at t.
    ///
    /// Falls back to the chord when the derivative degenerates at an
    /// endpoint whose control point coincides with it.
    pub fn tangent(&self, t: f32) -> Vector {
        let d = self.derivative(t);
        if d.square_length() > 0.0 {
            return d;
        }
        self.to - self.from
    }

    /// Swap the beginning and the end of the segment.
    pub fn flip(&self) -> Self {
        QuadraticBezierSegment {
            from: self.to,
            ctrl: self.ctrl,
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

    /// Return the y inflection point or None if this curve is y-monotonic.
    pub fn local_y_extremum_t(&self) -> Option<f32> {
        valid_unit_divide(
            self.from.y - self.ctrl.y,
            self.from.y - 2.0 * self.ctrl.y + self.to.y,
        )
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

    /// Return the sub-curve inside a given range of t.
    pub fn split_range(&self, t_range: Range<f32>) -> Self {
        let t0 = t_range.start;
        let t1 = t_range.end;

        let from = self.sample(t0);
        let to = self.sample(t1);
        let ctrl = from + (self.ctrl - self.from).lerp(self.to - self.ctrl, t0) * (t1 - t0);

        QuadraticBezierSegment { from, ctrl, to }
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: f32) -> (QuadraticBezierSegment, QuadraticBezierSegment) {
        let split_point = self.sample(t);

        (
            QuadraticBezierSegment {
                from: self.from,
                ctrl: self.from.lerp(self.ctrl, t),
                to: split_point,
            },
            QuadraticBezierSegment {
                from: split_point,
                ctrl: self.ctrl.lerp(self.to, t),
                to: self.to,
            },
        )
    }

    /// Chop into y-monotonic sub-curves.
    ///
    /// The split point's neighborhood is flattened so that both halves are
    /// strictly monotonic even after rounding.
    pub fn chop_at_y_extrema(&self) -> (Self, Option<Self>) {
        if self.is_y_monotonic() {
            return (*self, None);
        }
        if let Some(t) = self.local_y_extremum_t() {
            let (mut a, mut b) = self.split(t);
            let y = a.to.y;
            a.ctrl.y = y;
            b.ctrl.y = y;
            return (a, Some(b));
        }
        // The control point pokes out but the extremum does not land in
        // (0, 1); clamping it restores monotonicity.
        let mut mono = *self;
        mono.ctrl.y = if (self.ctrl.y - self.from.y).abs() < (self.ctrl.y - self.to.y).abs() {
            self.from.y
        } else {
            self.to.y
        };
        (mono, None)
    }

    /// The parameter of maximum curvature (0 or 1 when curvature peaks at
    /// an endpoint).
    pub fn max_curvature_t(&self) -> f32 {
        let a = self.ctrl - self.from;
        let b = self.from.to_vector() - self.ctrl.to_vector() * 2.0 + self.to.to_vector();

        let mut numer = -(a.x * b.x + a.y * b.y);
        let mut denom = b.x * b.x + b.y * b.y;
        if denom < 0.0 {
            numer = -numer;
            denom = -denom;
        }
        if numer <= 0.0 {
            return 0.0;
        }
        if numer >= denom {
            // Also catches denom == 0.
            return 1.0;
        }
        numer / denom
    }

    /// Elevate this curve to a cubic bézier.
    pub fn to_cubic(&self) -> CubicBezierSegment {
        CubicBezierSegment {
            from: self.from,
            ctrl1: (self.from + self.ctrl.to_vector() * 2.0) / 3.0,
            ctrl2: (self.to + self.ctrl.to_vector() * 2.0) / 3.0,
            to: self.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point;

    #[test]
    fn sample_endpoints() {
        let c = QuadraticBezierSegment {
            from: point(0.0, 0.0),
            ctrl: point(1.0, 2.0),
            to: point(2.0, 0.0),
        };
        assert_eq!(c.sample(0.0), c.from);
        assert_eq!(c.sample(1.0), c.to);
        assert_eq!(c.sample(0.5), point(1.0, 1.0));
    }

    #[test]
    fn y_extrema_chop() {
        let c = QuadraticBezierSegment {
            from: point(0.0, 0.0),
            ctrl: point(1.0, 2.0),
            to: point(2.0, 0.0),
        };
        let (a, b) = c.chop_at_y_extrema();
        let b = b.unwrap();
        assert_eq!(a.to, b.from);
        assert!((a.to.y - 1.0).abs() < 1e-6);
        assert!(a.is_y_monotonic());
        assert!(b.is_y_monotonic());

        let mono = QuadraticBezierSegment {
            from: point(0.0, 0.0),
            ctrl: point(1.0, 0.5),
            to: point(2.0, 2.0),
        };
        assert!(mono.chop_at_y_extrema().1.is_none());
    }

    #[test]
    fn split_matches_split_range() {
        let c = QuadraticBezierSegment {
            from: point(0.0, 0.0),
            ctrl: point(3.0, 4.0),
            to: point(6.0, -2.0),
        };
        let (a, _) = c.split(0.3);
        let r = c.split_range(0.0..0.3);
        assert!((a.ctrl - r.ctrl).length() < 1e-5);
        assert!((a.to - r.to).length() < 1e-5);
    }
}

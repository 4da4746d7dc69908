use crate::{Point, Vector};

use core::ops::Range;

/// A linear segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LineSegment {
    pub from: Point,
    pub to: Point,
}

impl LineSegment {
    /// Sample the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: f32) -> Point {
        self.from.lerp(self.to, t)
    }

    #[inline]
    pub fn to_vector(&self) -> Vector {
        self.to - self.from
    }

    /// The length of the segment.
    #[inline]
    pub fn length(&self) -> f32 {
        self.to_vector().length()
    }

    #[inline]
    pub fn square_length(&self) -> f32 {
        self.to_vector().square_length()
    }

    /// Swap the beginning and the end of the segment.
    #[inline]
    pub fn flip(&self) -> Self {
        LineSegment {
            from: self.to,
            to: self.from,
        }
    }

    /// Return the sub-segment inside a given range of t.
    pub fn split_range(&self, t_range: Range<f32>) -> Self {
        LineSegment {
            from: self.sample(t_range.start),
            to: self.sample(t_range.end),
        }
    }

    /// Split this segment into two at `t`.
    pub fn split(&self, t: f32) -> (Self, Self) {
        let mid = self.sample(t);
        (
            LineSegment {
                from: self.from,
                to: mid,
            },
            LineSegment {
                from: mid,
                to: self.to,
            },
        )
    }
}

#[test]
fn split_range_samples() {
    use crate::point;

    let seg = LineSegment {
        from: point(0.0, 0.0),
        to: point(10.0, 0.0),
    };
    let sub = seg.split_range(0.25..0.5);
    assert_eq!(sub.from, point(2.5, 0.0));
    assert_eq!(sub.to, point(5.0, 0.0));
    assert_eq!(seg.length(), 10.0);
}

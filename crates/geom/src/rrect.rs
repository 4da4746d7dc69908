//! Axis-aligned rounded rectangles.

use crate::scalar::are_finite;
use crate::{vector, Box2D, Vector};

/// One corner of a rounded rectangle, in the order the canonical verb
/// stream visits them when wound clockwise.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Corner {
    UpperLeft = 0,
    UpperRight = 1,
    LowerRight = 2,
    LowerLeft = 3,
}

/// What shape the radii actually describe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum RoundedRectKind {
    /// Zero width or height.
    Empty,
    /// All radii are zero.
    Rect,
    /// The radii cover the whole rect.
    Oval,
    /// One radius pair shared by all four corners.
    Simple,
    /// Radii are axis-symmetric: left x's match, right x's match, top y's
    /// match, bottom y's match.
    NinePatch,
    Complex,
}

/// An axis-aligned rectangle with an `(rx, ry)` radius pair per corner.
///
/// Construction sanitizes the radii: negatives collapse to zero and all
/// four pairs are scaled down proportionally until no side is overlapped
/// by its two radii.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct RoundedRect {
    rect: Box2D,
    radii: [Vector; 4],
    kind: RoundedRectKind,
}

// The x radii on one side may sum past the side's length; scaling must be
// computed in double precision so a huge radius next to a tiny one does not
// hide the overflow. This is the SVG/CSS corner-overlap rule.
fn min_scale(rad1: f32, rad2: f32, limit: f32, cur_min: f64) -> f64 {
    let sum = rad1 as f64 + rad2 as f64;
    if sum > limit as f64 && sum > 0.0 {
        cur_min.min(limit as f64 / sum)
    } else {
        cur_min
    }
}

impl RoundedRect {
    /// A rounded rect with the given per-corner radii, clamped to fit.
    pub fn new(rect: Box2D, radii: [Vector; 4]) -> Self {
        let coords = [rect.min.x, rect.min.y, rect.max.x, rect.max.y];
        if !are_finite(&coords) || rect.is_empty() {
            return RoundedRect {
                rect,
                radii: [Vector::zero(); 4],
                kind: RoundedRectKind::Empty,
            };
        }

        let mut radii = radii;
        let mut flat = [0.0f32; 8];
        for (i, r) in radii.iter().enumerate() {
            flat[i * 2] = r.x;
            flat[i * 2 + 1] = r.y;
        }
        if !are_finite(&flat) {
            radii = [Vector::zero(); 4];
        }
        for r in radii.iter_mut() {
            // A zero in either direction makes the corner square.
            if r.x <= 0.0 || r.y <= 0.0 {
                *r = Vector::zero();
            }
        }

        let width = rect.width();
        let height = rect.height();
        let mut scale = 1.0f64;
        scale = min_scale(radii[0].x, radii[1].x, width, scale);
        scale = min_scale(radii[1].y, radii[2].y, height, scale);
        scale = min_scale(radii[2].x, radii[3].x, width, scale);
        scale = min_scale(radii[3].y, radii[0].y, height, scale);
        if scale < 1.0 {
            for r in radii.iter_mut() {
                r.x = (r.x as f64 * scale) as f32;
                r.y = (r.y as f64 * scale) as f32;
            }
        }

        let kind = classify(&rect, &radii);
        RoundedRect { rect, radii, kind }
    }

    /// The common case: one radius pair for every corner.
    pub fn from_rect_xy(rect: Box2D, rx: f32, ry: f32) -> Self {
        RoundedRect::new(rect, [vector(rx, ry); 4])
    }

    #[inline]
    pub fn rect(&self) -> &Box2D {
        &self.rect
    }

    #[inline]
    pub fn radius(&self, corner: Corner) -> Vector {
        self.radii[corner as usize]
    }

    #[inline]
    pub fn radii(&self) -> &[Vector; 4] {
        &self.radii
    }

    #[inline]
    pub fn kind(&self) -> RoundedRectKind {
        self.kind
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kind == RoundedRectKind::Empty
    }

    #[inline]
    pub fn is_rect(&self) -> bool {
        self.kind == RoundedRectKind::Rect
    }

    #[inline]
    pub fn is_oval(&self) -> bool {
        self.kind == RoundedRectKind::Oval
    }
}

fn classify(rect: &Box2D, radii: &[Vector; 4]) -> RoundedRectKind {
    let all_zero = radii.iter().all(|r| r.x == 0.0 && r.y == 0.0);
    if all_zero {
        return RoundedRectKind::Rect;
    }

    let half_w = rect.width() / 2.0;
    let half_h = rect.height() / 2.0;
    if radii.iter().all(|r| r.x == half_w && r.y == half_h) {
        return RoundedRectKind::Oval;
    }

    let first = radii[0];
    if radii.iter().all(|r| *r == first) {
        return RoundedRectKind::Simple;
    }

    let left = radii[0].x == radii[3].x;
    let right = radii[1].x == radii[2].x;
    let top = radii[0].y == radii[1].y;
    let bottom = radii[2].y == radii[3].y;
    if left && right && top && bottom {
        return RoundedRectKind::NinePatch;
    }

    RoundedRectKind::Complex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point;

    fn rect(w: f32, h: f32) -> Box2D {
        Box2D {
            min: point(0.0, 0.0),
            max: point(w, h),
        }
    }

    #[test]
    fn classification() {
        assert!(RoundedRect::from_rect_xy(rect(10.0, 10.0), 0.0, 0.0).is_rect());
        assert!(RoundedRect::from_rect_xy(rect(10.0, 20.0), 5.0, 10.0).is_oval());
        assert_eq!(
            RoundedRect::from_rect_xy(rect(10.0, 10.0), 2.0, 3.0).kind(),
            RoundedRectKind::Simple
        );
        assert!(RoundedRect::from_rect_xy(rect(0.0, 10.0), 1.0, 1.0).is_empty());

        let nine = RoundedRect::new(
            rect(20.0, 20.0),
            [
                vector(1.0, 2.0),
                vector(3.0, 2.0),
                vector(3.0, 4.0),
                vector(1.0, 4.0),
            ],
        );
        assert_eq!(nine.kind(), RoundedRectKind::NinePatch);
    }

    #[test]
    fn negative_radii_collapse() {
        let rr = RoundedRect::from_rect_xy(rect(10.0, 10.0), -3.0, 5.0);
        assert!(rr.is_rect());
        assert_eq!(rr.radius(Corner::UpperLeft), Vector::zero());
    }

    #[test]
    fn oversized_radii_scale_down() {
        // Radii sum to 30 on a side of length 10: everything shrinks by 1/3.
        let rr = RoundedRect::from_rect_xy(rect(10.0, 100.0), 15.0, 15.0);
        let r = rr.radius(Corner::UpperLeft);
        assert!((r.x - 5.0).abs() < 1e-4);
        assert!((r.y - 5.0).abs() < 1e-4);
    }
}

#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::too_many_arguments)]

//! Path stroking: computes the filled outline of a stroked path.
//!
//! This crate is reexported in [contour](https://docs.rs/contour/).
//!
//! The stroker walks the source path segment by segment, laying down an
//! outer and an inner wall offset by half the stroke width, joining them
//! at corners and capping open ends. Offset curves are approximated by
//! quadratics, adaptively subdivided until the approximation passes a
//! midpoint-ray fidelity check (with a hard recursion cap so degenerate
//! inputs cannot spin forever).
//!
//! # Examples
//!
//! ```
//! use contour_path::Path;
//! use contour_path::math::point;
//! use contour_stroke::{stroke_path, StrokeOptions};
//!
//! let mut path = Path::new();
//! path.move_to(point(0.0, 0.0));
//! path.line_to(point(100.0, 0.0));
//!
//! let outline = stroke_path(&path, &StrokeOptions::default().with_width(10.0));
//! assert!(!outline.is_empty());
//! ```

pub use contour_path as path;
pub use contour_path::geom;
pub use contour_path::math;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

mod stroker;

use crate::math::{point, Box2D};
use crate::path::{Direction, Path, PathEvent};
use crate::stroker::PathStroker;

use contour_path::geom::rrect::RoundedRect;
use contour_path::segment_mask;

/// Draws at the beginning and end of an open path contour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    /// No stroke extension.
    #[default]
    Butt,
    /// Extends by a half circle.
    Round,
    /// Extends by half the stroke width.
    Square,
}

/// Specifies how corners are drawn when a shape is stroked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// Extends to the miter limit, then falls back to bevel.
    #[default]
    Miter,
    /// Adds a circular arc.
    Round,
    /// Connects the outside edges with a single segment.
    Bevel,
}

/// The per-corner stroke parameters. Most strokes use one of these for the
/// whole path; [`stroke_path_with_params`] cycles through a sequence of
/// them, one per segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeParams {
    pub miter_limit: f32,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for StrokeParams {
    fn default() -> Self {
        StrokeParams {
            miter_limit: DEFAULT_MITER_LIMIT,
            cap: LineCap::default(),
            join: LineJoin::default(),
        }
    }
}

pub const DEFAULT_MITER_LIMIT: f32 = 4.0;

/// Everything a stroke needs to know.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeOptions {
    /// The stroke thickness. Non-positive widths produce an empty result.
    pub width: f32,
    /// Maximum allowed ratio of miter length to half width before a miter
    /// join falls back to bevel.
    pub miter_limit: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    /// The "intended" output resolution; larger values spend more
    /// subdivision on offset-curve fidelity.
    pub res_scale: f32,
    /// Also fill the interior: the source geometry is added to the outline
    /// so stroke and fill rasterize as one winding region.
    pub do_fill: bool,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        StrokeOptions {
            width: 1.0,
            miter_limit: DEFAULT_MITER_LIMIT,
            cap: LineCap::default(),
            join: LineJoin::default(),
            res_scale: 1.0,
            do_fill: false,
        }
    }
}

impl StrokeOptions {
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_miter_limit(mut self, miter_limit: f32) -> Self {
        self.miter_limit = miter_limit;
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_res_scale(mut self, res_scale: f32) -> Self {
        self.res_scale = res_scale;
        self
    }

    pub fn with_fill(mut self) -> Self {
        self.do_fill = true;
        self
    }

    fn params(&self) -> StrokeParams {
        StrokeParams {
            miter_limit: self.miter_limit,
            cap: self.cap,
            join: self.join,
        }
    }
}

/// How a path is to be drawn, as carried across path-effect boundaries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum StrokeStyle {
    /// Filled geometry, no stroking.
    Fill,
    /// A stroke of width zero: exactly one device pixel, resolved by the
    /// rasterizer rather than by outline geometry.
    Hairline,
    Stroke,
    StrokeAndFill,
}

/// The stroking state a path effect receives and may rewrite (e.g. an
/// effect can consume the stroke and hand back fill geometry).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeRec {
    pub style: StrokeStyle,
    pub width: f32,
    pub miter_limit: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub res_scale: f32,
}

impl StrokeRec {
    pub fn fill() -> Self {
        StrokeRec {
            style: StrokeStyle::Fill,
            width: 0.0,
            miter_limit: DEFAULT_MITER_LIMIT,
            cap: LineCap::default(),
            join: LineJoin::default(),
            res_scale: 1.0,
        }
    }

    pub fn hairline() -> Self {
        StrokeRec {
            style: StrokeStyle::Hairline,
            ..StrokeRec::fill()
        }
    }

    pub fn from_options(options: &StrokeOptions) -> Self {
        StrokeRec {
            style: if options.do_fill {
                StrokeStyle::StrokeAndFill
            } else {
                StrokeStyle::Stroke
            },
            width: options.width,
            miter_limit: options.miter_limit,
            cap: options.cap,
            join: options.join,
            res_scale: options.res_scale,
        }
    }

    pub fn is_fill_style(&self) -> bool {
        self.style == StrokeStyle::Fill
    }

    /// Applies the record to a path, producing the geometry to fill.
    /// Fill-style records return a copy of the source.
    pub fn apply(&self, src: &Path) -> Path {
        match self.style {
            StrokeStyle::Fill | StrokeStyle::Hairline => src.clone(),
            StrokeStyle::Stroke | StrokeStyle::StrokeAndFill => {
                let options = StrokeOptions {
                    width: self.width,
                    miter_limit: self.miter_limit,
                    cap: self.cap,
                    join: self.join,
                    res_scale: self.res_scale,
                    do_fill: self.style == StrokeStyle::StrokeAndFill,
                };
                stroke_path(src, &options)
            }
        }
    }
}

/// Strokes `src`, producing the path whose filled interior equals the
/// stroked source. Returns an empty path when the width is not positive.
pub fn stroke_path(src: &Path, options: &StrokeOptions) -> Path {
    let radius = options.width * 0.5;
    if !(radius > 0.0) {
        return Path::new();
    }

    // A closed rectangle strokes into one or two rects directly.
    if let Some((rect, true, dir)) = src.is_rect() {
        let mut dst = stroke_rect(&rect, dir, options);
        if src.is_inverse_fill() {
            dst.toggle_inverse_fill_rule();
        }
        return dst;
    }

    // Stroke-and-fill of a closed convex line contour covers its own
    // center; the inner wall would only add seams.
    let ignore_center = options.do_fill
        && src.segment_mask() == segment_mask::LINE
        && src.is_last_contour_closed()
        && src.is_convex();

    let params = options.params();
    let mut stroker = PathStroker::new(radius, options.res_scale, ignore_center);
    let last_is_line = drive(&mut stroker, src, &mut |_| params);
    let mut dst = stroker.finish(last_is_line, &params);

    if options.do_fill && !ignore_center {
        if src.first_direction() == Some(Direction::Ccw) {
            dst.reverse_add_path(src);
        } else {
            dst.add_path(src, 0.0, 0.0, contour_path::path::AddPathMode::Append);
        }
    }

    if src.is_inverse_fill() {
        dst.toggle_inverse_fill_rule();
    }
    dst
}

/// Strokes `src` cycling through `params`, advancing to the next tuple on
/// every non-move verb (closes included). Width and resolution scale stay
/// path-wide. Returns `None` when `params` is empty or the width is not
/// positive.
pub fn stroke_path_with_params(
    src: &Path,
    width: f32,
    params: &[StrokeParams],
    res_scale: f32,
) -> Option<Path> {
    if params.is_empty() {
        return None;
    }
    let radius = width * 0.5;
    if !(radius > 0.0) {
        return None;
    }

    let ignore_center = src.segment_mask() == segment_mask::LINE
        && src.is_last_contour_closed()
        && src.is_convex();

    let mut segment_index = 0usize;
    let mut stroker = PathStroker::new(radius, res_scale, ignore_center);
    let last_is_line = drive(&mut stroker, src, &mut |advance| {
        let current = params[segment_index % params.len()];
        if advance {
            segment_index += 1;
        }
        current
    });
    let mut dst = stroker.finish(last_is_line, &params[segment_index % params.len()]);

    if src.is_inverse_fill() {
        dst.toggle_inverse_fill_rule();
    }
    Some(dst)
}

// The segment loop shared by both entry points. `params_for` is queried
// once per verb; `advance == true` consumes the current tuple.
fn drive(
    stroker: &mut PathStroker,
    src: &Path,
    params_for: &mut dyn FnMut(bool) -> StrokeParams,
) -> bool {
    let mut last_is_line = false;
    let mut iter = src.contour_iter(false);
    while let Some(event) = iter.next_event() {
        match event {
            PathEvent::Move { at } => {
                stroker.move_to(at);
            }
            PathEvent::Line { to, .. } => {
                let params = params_for(true);
                stroker.line_to(to, &params, Some(&iter));
                last_is_line = true;
            }
            PathEvent::Quadratic { ctrl, to, .. } => {
                let params = params_for(true);
                stroker.quad_to(ctrl, to, &params);
                last_is_line = false;
            }
            PathEvent::Conic { ctrl, to, weight, .. } => {
                let params = params_for(true);
                stroker.conic_to(ctrl, to, weight, &params);
                last_is_line = false;
            }
            PathEvent::Cubic { ctrl1, ctrl2, to, .. } => {
                let params = params_for(true);
                stroker.cubic_to(ctrl1, ctrl2, to, &params);
                last_is_line = false;
            }
            PathEvent::Close { .. } => {
                let params = params_for(false);
                if params.cap != LineCap::Butt {
                    // A contour of only a move (or only zero-length edges)
                    // still deserves square or round caps; pretend it ended
                    // in a zero-length line.
                    if stroker.has_only_move_to() {
                        stroker.line_to(stroker.move_to_pt(), &params, None);
                        last_is_line = true;
                        continue;
                    }
                    if stroker.is_current_contour_empty() {
                        last_is_line = true;
                        continue;
                    }
                }
                let _ = params_for(true);
                stroker.close(last_is_line, &params);
            }
        }
    }
    last_is_line
}

// Stroking an axis-aligned rect needs no curve machinery: the outer wall
// is the rect outset by the radius (with its corners beveled or rounded
// per the join), the inner wall an inset counter-wound rect when the
// stroke does not swallow the interior.
fn stroke_rect(rect: &Box2D, mut dir: Direction, options: &StrokeOptions) -> Path {
    let mut dst = Path::new();
    let radius = options.width * 0.5;
    if !(radius > 0.0) {
        return dst;
    }

    let rw = rect.width();
    let rh = rect.height();
    if (rw < 0.0) != (rh < 0.0) {
        dir = dir.opposite();
    }
    let rect = Box2D {
        min: rect.min.min(rect.max),
        max: rect.min.max(rect.max),
    };
    let rw = rect.width();
    let rh = rect.height();

    let outer = rect.inflate(radius, radius);

    let mut join = options.join;
    if join == LineJoin::Miter && options.miter_limit < core::f32::consts::SQRT_2 {
        join = LineJoin::Bevel;
    }

    match join {
        LineJoin::Miter => {
            dst.add_rect(&outer, dir, 0);
        }
        LineJoin::Bevel => {
            add_bevel_rect(&mut dst, &rect, &outer, dir);
        }
        LineJoin::Round => {
            dst.add_rrect(
                &RoundedRect::from_rect_xy(outer, radius, radius),
                dir,
                if dir == Direction::Cw { 6 } else { 7 },
            );
        }
    }

    if options.width < rw.min(rh) && !options.do_fill {
        let inner = rect.inflate(-radius, -radius);
        dst.add_rect(&inner, dir.opposite(), 0);
    }
    dst
}

fn add_bevel_rect(dst: &mut Path, r: &Box2D, outer: &Box2D, dir: Direction) {
    let mut pts = [
        point(r.min.x, outer.min.y),
        point(r.max.x, outer.min.y),
        point(outer.max.x, r.min.y),
        point(outer.max.x, r.max.y),
        point(r.max.x, outer.max.y),
        point(r.min.x, outer.max.y),
        point(outer.min.x, r.max.y),
        point(outer.min.x, r.min.y),
    ];
    if dir == Direction::Ccw {
        pts.reverse();
    }
    dst.add_polygon(&pts, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Verb;
    use contour_path::geom::scalar::ROOT_2_OVER_2;

    fn rect(l: f32, t: f32, r: f32, b: f32) -> Box2D {
        Box2D {
            min: point(l, t),
            max: point(r, b),
        }
    }

    #[test]
    fn zero_width_stroke_is_empty() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(10.0, 0.0));
        let out = stroke_path(&path, &StrokeOptions::default().with_width(0.0));
        assert!(out.is_empty());
        let out = stroke_path(&path, &StrokeOptions::default().with_width(-3.0));
        assert!(out.is_empty());
    }

    #[test]
    fn horizontal_line_with_butt_caps() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(100.0, 0.0));
        let out = stroke_path(&path, &StrokeOptions::default().with_width(10.0));
        assert!(!out.is_empty());
        let b = out.bounds();
        assert!((b.min.x - 0.0).abs() < 1e-4);
        assert!((b.max.x - 100.0).abs() < 1e-4);
        assert!((b.min.y + 5.0).abs() < 1e-4);
        assert!((b.max.y - 5.0).abs() < 1e-4);
        assert!(out.contains(50.0, 0.0));
        assert!(out.contains(50.0, 4.0));
        assert!(!out.contains(50.0, 6.0));
        assert!(!out.contains(-1.0, 0.0));
    }

    #[test]
    fn square_caps_extend_the_ends() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(100.0, 0.0));
        let out = stroke_path(
            &path,
            &StrokeOptions::default().with_width(10.0).with_cap(LineCap::Square),
        );
        let b = out.bounds();
        assert!((b.min.x + 5.0).abs() < 1e-4);
        assert!((b.max.x - 105.0).abs() < 1e-4);
    }

    #[test]
    fn zero_length_contour_round_cap_is_a_disc() {
        let mut path = Path::new();
        path.move_to(point(5.0, 5.0));
        path.close();
        let out = stroke_path(
            &path,
            &StrokeOptions::default().with_width(4.0).with_cap(LineCap::Round),
        );
        assert!(!out.is_empty());
        let b = out.bounds();
        assert!((b.min.x - 3.0).abs() < 1e-3);
        assert!((b.min.y - 3.0).abs() < 1e-3);
        assert!((b.max.x - 7.0).abs() < 1e-3);
        assert!((b.max.y - 7.0).abs() < 1e-3);
        // The filled area is a real disc around the point.
        assert!(out.contains(5.0, 5.0));
        assert!(out.contains(6.2, 5.0));
        assert!(!out.contains(7.5, 7.5));
    }

    #[test]
    fn zero_length_contour_butt_cap_is_empty() {
        let mut path = Path::new();
        path.move_to(point(5.0, 5.0));
        path.close();
        let out = stroke_path(&path, &StrokeOptions::default().with_width(4.0));
        assert!(out.bounds().is_empty());
    }

    #[test]
    fn closed_rect_uses_the_rect_fast_path() {
        let mut path = Path::new();
        path.add_rect(&rect(10.0, 10.0, 50.0, 50.0), Direction::Cw, 0);
        let out = stroke_path(&path, &StrokeOptions::default().with_width(4.0));
        assert_eq!(out.bounds(), rect(8.0, 8.0, 52.0, 52.0));
        // Outer rect + inner counter-wound rect.
        assert_eq!(
            out.verbs().iter().filter(|v| **v == Verb::Move).count(),
            2
        );
        assert!(out.contains(10.0, 10.0));
        assert!(!out.contains(30.0, 30.0));
        assert!(out.contains(48.5, 30.0));

        // A stroke wider than the rect swallows the hole.
        let fat = stroke_path(&path, &StrokeOptions::default().with_width(80.0));
        assert!(fat.contains(30.0, 30.0));
    }

    #[test]
    fn rect_with_round_join_has_conics() {
        let mut path = Path::new();
        path.add_rect(&rect(0.0, 0.0, 10.0, 10.0), Direction::Cw, 0);
        let out = stroke_path(
            &path,
            &StrokeOptions::default().with_width(2.0).with_join(LineJoin::Round),
        );
        assert!(out.segment_mask() & segment_mask::CONIC != 0);
        assert_eq!(out.bounds(), rect(-1.0, -1.0, 11.0, 11.0));
    }

    #[test]
    fn rect_with_bevel_join_cuts_corners() {
        let mut path = Path::new();
        path.add_rect(&rect(0.0, 0.0, 10.0, 10.0), Direction::Cw, 0);
        let out = stroke_path(
            &path,
            &StrokeOptions::default().with_width(2.0).with_join(LineJoin::Bevel),
        );
        assert_eq!(out.bounds(), rect(-1.0, -1.0, 11.0, 11.0));
        // The outer contour has eight corners instead of four.
        let outer_lines = out
            .verbs()
            .iter()
            .take_while(|v| **v != Verb::Close)
            .filter(|v| **v == Verb::Line)
            .count();
        assert_eq!(outer_lines, 7);
    }

    #[test]
    fn stroked_triangle_contains_its_outline_only() {
        let mut path = Path::new();
        path.add_polygon(
            &[point(10.0, 10.0), point(20.0, 50.0), point(30.0, 10.0)],
            true,
        );
        let out = stroke_path(&path, &StrokeOptions::default().with_width(1.0));
        assert!(!out.is_empty());
        assert!(out.contains(10.0, 10.2));
        // The triangle's interior is not part of the stroke.
        assert!(!out.contains(20.0, 20.0));
    }

    #[test]
    fn do_fill_covers_the_interior() {
        for dir in [Direction::Cw, Direction::Ccw] {
            let mut path = Path::new();
            path.move_to(point(0.0, 0.0));
            path.quadratic_bezier_to(point(50.0, 100.0), point(100.0, 0.0));
            path.close();
            if dir == Direction::Ccw {
                let mut rev = Path::new();
                rev.reverse_add_path(&path);
                path = rev;
            }
            let out = stroke_path(&path, &StrokeOptions::default().with_width(2.0).with_fill());
            assert!(out.contains(50.0, 20.0), "lost interior for {dir:?}");
            assert!(out.contains(50.0, 0.0));
        }
    }

    #[test]
    fn inverse_fill_is_preserved() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(10.0, 0.0));
        path.toggle_inverse_fill_rule();
        let out = stroke_path(&path, &StrokeOptions::default().with_width(2.0));
        assert!(out.is_inverse_fill());

        let mut closed_rect = Path::new();
        closed_rect.add_rect(&rect(0.0, 0.0, 10.0, 10.0), Direction::Cw, 0);
        closed_rect.toggle_inverse_fill_rule();
        let out = stroke_path(&closed_rect, &StrokeOptions::default().with_width(2.0));
        assert!(out.is_inverse_fill());
    }

    #[test]
    fn curves_stroke_into_quads() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.cubic_bezier_to(point(30.0, 60.0), point(70.0, 60.0), point(100.0, 0.0));
        let out = stroke_path(&path, &StrokeOptions::default().with_width(6.0));
        assert!(!out.is_empty());
        assert!(out.segment_mask() & segment_mask::QUAD != 0);
        // A mid-curve probe: the stroke band covers the curve but not the
        // area well off it.
        assert!(out.contains(50.0, 45.0));
        assert!(!out.contains(50.0, 20.0));
    }

    #[test]
    fn conic_segments_stroke_cleanly() {
        let mut path = Path::new();
        path.move_to(point(10.0, 0.0));
        path.conic_to(point(10.0, 10.0), point(0.0, 10.0), ROOT_2_OVER_2);
        let out = stroke_path(&path, &StrokeOptions::default().with_width(2.0));
        assert!(!out.is_empty());
        // The stroke band straddles the quarter arc of radius 10 around
        // the origin.
        let on_arc = point(10.0 / core::f32::consts::SQRT_2, 10.0 / core::f32::consts::SQRT_2);
        assert!(out.contains(on_arc.x, on_arc.y));
        assert!(!out.contains(5.0, 5.0));
    }

    #[test]
    fn params_cycle_per_segment() {
        // A zig-zag with alternating miter and round joins.
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(20.0, 0.0));
        path.line_to(point(20.0, 20.0));
        path.line_to(point(40.0, 20.0));
        let params = [
            StrokeParams {
                miter_limit: 10.0,
                cap: LineCap::Butt,
                join: LineJoin::Miter,
            },
            StrokeParams {
                miter_limit: 10.0,
                cap: LineCap::Butt,
                join: LineJoin::Round,
            },
        ];
        let out = stroke_path_with_params(&path, 4.0, &params, 1.0).unwrap();
        assert!(!out.is_empty());
        // The second join (round, applied by the third segment's params
        // cycling back) leaves conic arcs in the outline.
        assert!(out.segment_mask() & segment_mask::CONIC != 0);

        assert!(stroke_path_with_params(&path, 4.0, &[], 1.0).is_none());
        assert!(stroke_path_with_params(&path, 0.0, &params, 1.0).is_none());
    }

    #[test]
    fn degenerate_curves_fall_back_to_lines() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        // Control points collapsed onto the baseline.
        path.quadratic_bezier_to(point(5.0, 0.0), point(10.0, 0.0));
        path.cubic_bezier_to(point(12.0, 0.0), point(14.0, 0.0), point(20.0, 0.0));
        let out = stroke_path(&path, &StrokeOptions::default().with_width(2.0));
        assert!(!out.is_empty());
        let b = out.bounds();
        assert!((b.min.y + 1.0).abs() < 1e-4);
        assert!((b.max.y - 1.0).abs() < 1e-4);
    }
}

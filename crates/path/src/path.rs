//! The path value type.

use crate::builder::Builder;
use crate::data::{self, PathData, ShapeHint};
use crate::iterator::{ContourIter, Iter};
use crate::math::{point, Box2D, Matrix, Point, Vector};
use crate::{Convexity, Direction, FillRule, PathEvent, Verb};

use contour_geom::rrect::{Corner, RoundedRect};
use contour_geom::scalar::{are_finite, ROOT_2_OVER_2};
use contour_geom::ConicSegment;

use core::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// How [`Path::add_path_with`] stitches the source path on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum AddPathMode {
    /// Source contours are appended verbatim.
    Append,
    /// The source's first contour continues the current one: its leading
    /// move becomes a line from the current last point (unless the points
    /// coincide).
    Extend,
}

/// A sequence of contours built from move/line/quad/conic/cubic/close
/// verbs.
///
/// `Path` is a value type: copying it is cheap because copies share one
/// reference-counted body, and the body is deep-copied the first time a
/// co-owner edits it. Metadata (bounds, convexity, first direction) is
/// computed on demand and cached; the convexity and direction caches live
/// on the value itself as relaxed atomics so that logically-read-only
/// queries stay usable from multiple threads.
pub struct Path {
    pub(crate) data: Arc<PathData>,
    fill_rule: FillRule,
    // Index into the point array of the most recent move, bit-inverted
    // after a close as a signal that the next curve verb must re-issue a
    // move to that point.
    pub(crate) last_move_index: i32,
    convexity: AtomicU8,
    first_direction: AtomicU8,
}

const INITIAL_LAST_MOVE_INDEX: i32 = !0;

// first_direction cache encoding. Convexity uses the enum's own repr.
const DIR_UNKNOWN: u8 = 0;
const DIR_CW: u8 = 1;
const DIR_CCW: u8 = 2;

impl Path {
    /// Creates an empty path with a winding fill rule.
    pub fn new() -> Path {
        Path {
            data: PathData::shared_empty(),
            fill_rule: FillRule::Winding,
            last_move_index: INITIAL_LAST_MOVE_INDEX,
            convexity: AtomicU8::new(Convexity::Unknown as u8),
            first_direction: AtomicU8::new(DIR_UNKNOWN),
        }
    }

    /// Creates a [Builder](crate::builder::Builder) to build a path.
    pub fn builder() -> Builder {
        Builder::new()
    }

    //------------------------------------------------------------------
    // Queries

    #[inline]
    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    #[inline]
    pub fn set_fill_rule(&mut self, fill_rule: FillRule) {
        self.fill_rule = fill_rule;
    }

    #[inline]
    pub fn is_inverse_fill(&self) -> bool {
        self.fill_rule.is_inverse()
    }

    /// Flips the "inverse" bit of the fill rule.
    #[inline]
    pub fn toggle_inverse_fill_rule(&mut self) {
        self.fill_rule = self.fill_rule.toggled_inverse();
    }

    /// A path with no verbs at all. A lone move makes the path non-empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.verbs.is_empty()
    }

    #[inline]
    pub fn count_verbs(&self) -> usize {
        self.data.verbs.len()
    }

    #[inline]
    pub fn count_points(&self) -> usize {
        self.data.points.len()
    }

    #[inline]
    pub fn verbs(&self) -> &[Verb] {
        &self.data.verbs
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.data.points
    }

    #[inline]
    pub fn conic_weights(&self) -> &[f32] {
        &self.data.weights
    }

    /// The point at `index`, or the origin when out of range.
    pub fn point(&self, index: usize) -> Point {
        self.data.points.get(index).copied().unwrap_or_else(Point::zero)
    }

    pub fn last_point(&self) -> Option<Point> {
        self.data.points.last().copied()
    }

    /// Bits over the curve kinds present; see [`crate::segment_mask`].
    #[inline]
    pub fn segment_mask(&self) -> u8 {
        self.data.segment_mask
    }

    /// Bounds of all points and control points. Looser than the filled
    /// area; `(0,0,0,0)` for empty or non-finite paths.
    pub fn bounds(&self) -> Box2D {
        self.data.bounds().bounds
    }

    /// False as soon as any stored coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.data.bounds().is_finite
    }

    pub(crate) fn has_computed_bounds(&self) -> bool {
        self.data.has_computed_bounds()
    }

    /// Iterates the verbs as stored.
    pub fn iter(&self) -> Iter {
        Iter::new(self)
    }

    /// Iterates with close-line synthesis; with `force_close` every contour
    /// is closed whether or not it ends in a close verb.
    pub fn contour_iter(&self, force_close: bool) -> ContourIter {
        ContourIter::new(self, force_close)
    }

    /// True when the verb stream is exactly `Move, Line`.
    pub fn is_line(&self) -> Option<[Point; 2]> {
        if self.data.verbs.len() == 2 && self.data.verbs[1] == Verb::Line {
            return Some([self.data.points[0], self.data.points[1]]);
        }
        None
    }

    pub fn is_last_contour_closed(&self) -> bool {
        self.data.verbs.last() == Some(&Verb::Close)
    }

    /// Whether every point from `start_index` on coincides with the first
    /// of them.
    pub fn is_zero_length_since_point(&self, start_index: usize) -> bool {
        let pts = &self.data.points[start_index.min(self.data.points.len())..];
        if pts.len() < 2 {
            return true;
        }
        pts[1..].iter().all(|p| *p == pts[0])
    }

    pub(crate) fn has_only_move_tos(&self) -> bool {
        self.data.verbs.iter().all(|v| *v == Verb::Move || *v == Verb::Close)
    }

    //------------------------------------------------------------------
    // Convexity and direction caches

    pub(crate) fn convexity_or_unknown(&self) -> Convexity {
        match self.convexity.load(Ordering::Relaxed) {
            1 => Convexity::Convex,
            2 => Convexity::Concave,
            _ => Convexity::Unknown,
        }
    }

    pub(crate) fn set_convexity(&self, convexity: Convexity) {
        self.convexity.store(convexity as u8, Ordering::Relaxed);
    }

    /// The path's convexity, computing and caching it on a miss.
    pub fn convexity(&self) -> Convexity {
        let convexity = self.convexity_or_unknown();
        if convexity != Convexity::Unknown {
            return convexity;
        }
        crate::convexity::compute_convexity(self)
    }

    pub fn is_convex(&self) -> bool {
        self.convexity() == Convexity::Convex
    }

    pub(crate) fn first_direction_or_unknown(&self) -> Option<Direction> {
        match self.first_direction.load(Ordering::Relaxed) {
            DIR_CW => Some(Direction::Cw),
            DIR_CCW => Some(Direction::Ccw),
            _ => None,
        }
    }

    pub(crate) fn set_first_direction(&self, dir: Option<Direction>) {
        let raw = match dir {
            None => DIR_UNKNOWN,
            Some(Direction::Cw) => DIR_CW,
            Some(Direction::Ccw) => DIR_CCW,
        };
        self.first_direction.store(raw, Ordering::Relaxed);
    }

    /// The winding direction of the outermost contour, or `None` when the
    /// path has no discernible turn (e.g. only straight back-and-forth
    /// segments).
    pub fn first_direction(&self) -> Option<Direction> {
        crate::convexity::compute_first_direction(self)
    }

    //------------------------------------------------------------------
    // Edits

    /// Uniquely-owned access to the body; deep copies it when shared and
    /// invalidates every content cache.
    pub(crate) fn edit(&mut self) -> &mut PathData {
        let data = Arc::make_mut(&mut self.data);
        data.mark_dirty();
        data
    }

    fn dirty_after_edit(&mut self) {
        self.set_convexity(Convexity::Unknown);
        self.set_first_direction(None);
    }

    pub fn move_to(&mut self, at: Point) -> &mut Self {
        self.last_move_index = self.data.points.len() as i32;
        self.edit().grow_for_verb(Verb::Move, 0.0)[0] = at;
        self.dirty_after_edit();
        self
    }

    /// Re-issues a move when the previous verb closed the contour (to the
    /// closed contour's move point) or when nothing was moved yet (to the
    /// origin).
    pub(crate) fn inject_move_to_if_needed(&mut self) {
        if self.last_move_index < 0 {
            let at = if self.data.verbs.is_empty() {
                point(0.0, 0.0)
            } else {
                self.data.points[!self.last_move_index as usize]
            };
            self.move_to(at);
        }
    }

    pub fn line_to(&mut self, to: Point) -> &mut Self {
        self.inject_move_to_if_needed();
        self.edit().grow_for_verb(Verb::Line, 0.0)[0] = to;
        self.dirty_after_edit();
        self
    }

    pub fn quadratic_bezier_to(&mut self, ctrl: Point, to: Point) -> &mut Self {
        self.inject_move_to_if_needed();
        let pts = self.edit().grow_for_verb(Verb::Quad, 0.0);
        pts[0] = ctrl;
        pts[1] = to;
        self.dirty_after_edit();
        self
    }

    /// A rational quadratic. Weights that cannot produce a conic degrade:
    /// non-positive weights draw a line to `to`, non-finite weights a pair
    /// of lines, and a weight of one an ordinary quadratic.
    pub fn conic_to(&mut self, ctrl: Point, to: Point, weight: f32) -> &mut Self {
        if !(weight > 0.0) {
            self.line_to(to);
        } else if !weight.is_finite() {
            self.line_to(ctrl);
            self.line_to(to);
        } else if weight == 1.0 {
            self.quadratic_bezier_to(ctrl, to);
        } else {
            self.inject_move_to_if_needed();
            let pts = self.edit().grow_for_verb(Verb::Conic, weight);
            pts[0] = ctrl;
            pts[1] = to;
            self.dirty_after_edit();
        }
        self
    }

    pub fn cubic_bezier_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) -> &mut Self {
        self.inject_move_to_if_needed();
        let pts = self.edit().grow_for_verb(Verb::Cubic, 0.0);
        pts[0] = ctrl1;
        pts[1] = ctrl2;
        pts[2] = to;
        self.dirty_after_edit();
        self
    }

    /// Closes the current contour. A no-op on empty paths and after a
    /// close.
    pub fn close(&mut self) -> &mut Self {
        match self.data.verbs.last() {
            None | Some(Verb::Close) => {}
            _ => {
                self.edit().grow_for_verb(Verb::Close, 0.0);
                self.dirty_after_edit();
            }
        }
        // Signal that the next curve verb needs a move.
        if self.last_move_index >= 0 {
            self.last_move_index = !self.last_move_index;
        }
        self
    }

    /// Rewrites the final point in place; on an empty path this is a move.
    pub fn set_last_point(&mut self, p: Point) {
        if self.data.points.is_empty() {
            self.move_to(p);
        } else {
            let data = self.edit();
            *data.points.last_mut().unwrap() = p;
            self.dirty_after_edit();
        }
    }

    /// Releases the body and restores the default state.
    pub fn reset(&mut self) -> &mut Self {
        self.data = PathData::shared_empty();
        self.reset_fields();
        self
    }

    /// Empties the path but keeps the body's allocations for reuse.
    pub fn rewind(&mut self) -> &mut Self {
        if Arc::get_mut(&mut self.data).is_some() {
            Arc::make_mut(&mut self.data).rewind();
        } else {
            // Shared body: the capacity is not ours to keep.
            self.data = Arc::new(PathData::new());
        }
        self.reset_fields();
        self
    }

    fn reset_fields(&mut self) {
        self.last_move_index = INITIAL_LAST_MOVE_INDEX;
        self.fill_rule = FillRule::Winding;
        self.set_convexity(Convexity::Unknown);
        self.set_first_direction(None);
    }

    /// Translates every point in place.
    pub fn offset(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.transform(&Matrix::translation(dx, dy));
        self
    }

    //------------------------------------------------------------------
    // Append-shape operations

    /// Appends a closed axis-aligned rectangle contour.
    ///
    /// `start_index` picks the corner beginning the stream: 0 is top-left,
    /// then clockwise (1 top-right, 2 bottom-right, 3 bottom-left).
    pub fn add_rect(&mut self, rect: &Box2D, dir: Direction, start_index: usize) -> &mut Self {
        self.set_first_direction(if self.has_only_move_tos() { Some(dir) } else { None });
        let saved_dir = self.first_direction_or_unknown();
        let update = self.begin_shape_bounds(rect);

        let mut iter = RectPointIter::new_rect(rect, dir, start_index);
        self.move_to(iter.current());
        self.line_to(iter.next());
        self.line_to(iter.next());
        self.line_to(iter.next());
        self.close();

        self.finish_shape_bounds(update);
        self.set_first_direction(saved_dir);
        self
    }

    /// Appends a closed oval inscribed in `oval` as four conic quarter
    /// arcs. `start_index` selects the extremum that begins the stream
    /// (0 top, 1 right, 2 bottom, 3 left).
    pub fn add_oval(&mut self, oval: &Box2D, dir: Direction, start_index: usize) -> &mut Self {
        // A previous lone move must not break oval recognition (callers
        // position before adding), but any curve geometry does.
        let is_oval = self.has_only_move_tos();
        self.set_first_direction(if is_oval { Some(dir) } else { None });
        let saved_dir = self.first_direction_or_unknown();
        let update = self.begin_shape_bounds(oval);

        let mut oval_iter = OvalPointIter::new_oval(oval, dir, start_index);
        let mut rect_iter = RectPointIter::new_rect(
            oval,
            dir,
            start_index + if dir == Direction::Cw { 0 } else { 1 },
        );

        self.move_to(oval_iter.current());
        for _ in 0..4 {
            self.conic_to(rect_iter.next(), oval_iter.next(), ROOT_2_OVER_2);
        }
        self.close();

        self.finish_shape_bounds(update);
        self.set_first_direction(saved_dir);
        if is_oval {
            Arc::make_mut(&mut self.data).hint = ShapeHint::Oval {
                ccw: dir == Direction::Ccw,
                start: (start_index % 4) as u8,
            };
        }
        self
    }

    /// Appends a circle of radius `r` centered on `(x, y)`. No-op unless
    /// `r > 0`.
    pub fn add_circle(&mut self, x: f32, y: f32, r: f32, dir: Direction) -> &mut Self {
        if r > 0.0 {
            self.add_oval(
                &Box2D {
                    min: point(x - r, y - r),
                    max: point(x + r, y + r),
                },
                dir,
                1,
            );
        }
        self
    }

    /// Appends a rounded rectangle, degrading to [`add_rect`](Self::add_rect)
    /// when all radii are zero and to [`add_oval`](Self::add_oval) when they
    /// cover the whole rect. `start_index` runs over the eight arc
    /// endpoints; its parity decides whether the stream starts with a line
    /// or with a conic.
    pub fn add_rrect(&mut self, rrect: &RoundedRect, dir: Direction, start_index: usize) -> &mut Self {
        let is_rrect = self.has_only_move_tos();
        let bounds = *rrect.rect();

        if rrect.is_rect() || rrect.is_empty() {
            // Degenerate: the radii points collapse onto the corners.
            self.add_rect(&bounds, dir, (start_index + 1) / 2);
        } else if rrect.is_oval() {
            self.add_oval(&bounds, dir, start_index / 2);
        } else {
            self.set_first_direction(if is_rrect { Some(dir) } else { None });
            let saved_dir = self.first_direction_or_unknown();
            let update = self.begin_shape_bounds(&bounds);

            // Odd start indices begin on a conic when wound clockwise,
            // even ones when wound counter-clockwise.
            let starts_with_conic = (start_index & 1 == 1) == (dir == Direction::Cw);
            let weight = ROOT_2_OVER_2;

            let mut rrect_iter = RRectPointIter::new_rrect(rrect, dir, start_index);
            // The conic control points are the rect corners, tracking one
            // step behind the arc endpoints.
            let rect_start = start_index / 2 + if dir == Direction::Cw { 0 } else { 1 };
            let mut rect_iter = RectPointIter::new_rect(&bounds, dir, rect_start);

            self.move_to(rrect_iter.current());
            if starts_with_conic {
                for _ in 0..3 {
                    self.conic_to(rect_iter.next(), rrect_iter.next(), weight);
                    self.line_to(rrect_iter.next());
                }
                self.conic_to(rect_iter.next(), rrect_iter.next(), weight);
                // The final line is implied by the close.
            } else {
                for _ in 0..4 {
                    self.line_to(rrect_iter.next());
                    self.conic_to(rect_iter.next(), rrect_iter.next(), weight);
                }
            }
            self.close();

            self.finish_shape_bounds(update);
            self.set_first_direction(saved_dir);
            if is_rrect {
                Arc::make_mut(&mut self.data).hint = ShapeHint::RRect {
                    ccw: dir == Direction::Ccw,
                    start: (start_index % 8) as u8,
                };
            }
        }
        self
    }

    /// Appends `points` as a polygon contour: a move, `len - 1` lines and
    /// an optional close. No-op on an empty slice.
    pub fn add_polygon(&mut self, points: &[Point], close: bool) -> &mut Self {
        if points.is_empty() {
            return self;
        }
        self.last_move_index = self.data.points.len() as i32;

        let data = self.edit();
        data.grow_for_verb(Verb::Move, 0.0)[0] = points[0];
        if points.len() > 1 {
            data.grow_for_repeated_verb(Verb::Line, points.len() - 1)
                .copy_from_slice(&points[1..]);
        }
        if close {
            data.grow_for_verb(Verb::Close, 0.0);
            self.last_move_index = !self.last_move_index;
        }
        self.dirty_after_edit();
        self
    }

    /// Appends `src` translated by `(dx, dy)`.
    pub fn add_path(&mut self, src: &Path, dx: f32, dy: f32, mode: AddPathMode) -> &mut Self {
        self.add_path_with(src, &Matrix::translation(dx, dy), mode)
    }

    /// Appends `src` mapped through `matrix`.
    pub fn add_path_with(&mut self, src: &Path, matrix: &Matrix, mode: AddPathMode) -> &mut Self {
        if src.is_empty() {
            return self;
        }

        if mode == AddPathMode::Append && !matrix.has_perspective() {
            // Bulk path: splice the raw streams and map the new points in
            // place.
            let src_move = if src.last_move_index < 0 {
                !src.last_move_index
            } else {
                src.last_move_index
            };
            self.last_move_index = self.data.points.len() as i32 + src_move;

            let data = self.edit();
            let (new_pts, new_weights) = data.grow_for_data(&src.data);
            for (dst, s) in new_pts.iter_mut().zip(src.data.points.iter()) {
                *dst = matrix.map_point(*s);
            }
            new_weights.copy_from_slice(&src.data.weights);

            if self.data.verbs.last() == Some(&Verb::Close) {
                self.last_move_index = !self.last_move_index;
            }
            self.dirty_after_edit();
            return self;
        }

        let mut first_verb = true;
        for event in src.iter() {
            match event {
                PathEvent::Move { at } => {
                    let at = matrix.map_point(at);
                    if first_verb && mode == AddPathMode::Extend && !self.is_empty() {
                        self.inject_move_to_if_needed(); // in case last contour is closed
                        let last = self.last_point();
                        if self.last_move_index < 0 || last != Some(at) {
                            self.line_to(at);
                        }
                    } else {
                        self.move_to(at);
                    }
                }
                PathEvent::Line { to, .. } => {
                    self.line_to(matrix.map_point(to));
                }
                PathEvent::Quadratic { ctrl, to, .. } => {
                    self.quadratic_bezier_to(matrix.map_point(ctrl), matrix.map_point(to));
                }
                PathEvent::Conic { ctrl, to, weight, .. } => {
                    self.conic_to(matrix.map_point(ctrl), matrix.map_point(to), weight);
                }
                PathEvent::Cubic { ctrl1, ctrl2, to, .. } => {
                    self.cubic_bezier_to(
                        matrix.map_point(ctrl1),
                        matrix.map_point(ctrl2),
                        matrix.map_point(to),
                    );
                }
                PathEvent::Close { .. } => {
                    self.close();
                }
            }
            first_verb = false;
        }
        self
    }

    /// Appends `src` with its contours reversed, in reverse order: each
    /// original move becomes a close and each original close begins a new
    /// contour.
    pub fn reverse_add_path(&mut self, src: &Path) -> &mut Self {
        let src_data = src.data.clone();
        let verbs = &src_data.verbs;
        let points = &src_data.points;
        let weights = &src_data.weights;

        let mut pt_index = points.len();
        let mut weight_index = weights.len();
        let mut need_move = true;
        let mut need_close = false;

        for verb in verbs.iter().rev() {
            if need_move {
                // The contour's (reversed) starting point; consuming it
                // here keeps the cursor one short, which is exactly where
                // each verb's new end point (the previous verb's last
                // point) lives.
                pt_index -= 1;
                self.move_to(points[pt_index]);
                need_move = false;
            }
            match verb {
                Verb::Move => {
                    if need_close {
                        self.close();
                        need_close = false;
                    }
                    need_move = true;
                }
                Verb::Line => {
                    pt_index -= 1;
                    self.line_to(points[pt_index]);
                }
                Verb::Quad => {
                    pt_index -= 2;
                    self.quadratic_bezier_to(points[pt_index + 1], points[pt_index]);
                }
                Verb::Conic => {
                    pt_index -= 2;
                    weight_index -= 1;
                    self.conic_to(points[pt_index + 1], points[pt_index], weights[weight_index]);
                }
                Verb::Cubic => {
                    pt_index -= 3;
                    self.cubic_bezier_to(
                        points[pt_index + 2],
                        points[pt_index + 1],
                        points[pt_index],
                    );
                }
                Verb::Close => {
                    need_close = true;
                }
            }
        }
        self
    }

    //------------------------------------------------------------------
    // Transforms

    /// Returns this path mapped through `matrix`.
    pub fn transformed(&self, matrix: &Matrix) -> Path {
        let mut dst = self.clone();
        dst.transform(matrix);
        dst
    }

    /// Maps every point through `matrix` in place.
    pub fn transform(&mut self, matrix: &Matrix) {
        if matrix.is_identity() {
            return;
        }

        if matrix.has_perspective() {
            // Re-walk: quads become conics and cubics are subdivided so
            // their curvature stays bounded after the projective division.
            let mut tmp = Path::new();
            tmp.fill_rule = self.fill_rule;
            let mut iter = self.contour_iter(false);
            while let Some(event) = iter.next_event() {
                match event {
                    PathEvent::Move { at } => {
                        tmp.move_to(at);
                    }
                    PathEvent::Line { to, .. } => {
                        tmp.line_to(to);
                    }
                    PathEvent::Quadratic { from, ctrl, to } => {
                        let conic = ConicSegment { from, ctrl, to, w: 1.0 };
                        tmp.conic_to(ctrl, to, conic.transformed_weight(matrix));
                    }
                    PathEvent::Conic { from, ctrl, to, weight } => {
                        let conic = ConicSegment { from, ctrl, to, w: weight };
                        tmp.conic_to(ctrl, to, conic.transformed_weight(matrix));
                    }
                    PathEvent::Cubic { from, ctrl1, ctrl2, to } => {
                        let cubic = contour_geom::CubicBezierSegment { from, ctrl1, ctrl2, to };
                        subdivide_cubic(&mut tmp, &cubic, 2);
                    }
                    PathEvent::Close { .. } => {
                        tmp.close();
                    }
                }
            }
            let data = tmp.edit();
            for p in data.points.iter_mut() {
                *p = matrix.map_point(*p);
            }
            tmp.set_first_direction(None);
            *self = tmp;
            return;
        }

        let convexity = self.convexity_or_unknown();
        let first_direction = self.first_direction_or_unknown();

        self.data = Arc::new(data::transformed(&self.data, matrix));

        // Float numerics can bend a convex path concave; only pure
        // scale-translate of an axis-aligned path is safe to trust.
        let keep_convex = convexity == Convexity::Convex
            && matrix.is_scale_translate()
            && crate::shape::is_axis_aligned(self);
        self.set_convexity(if keep_convex { Convexity::Convex } else { Convexity::Unknown });

        let det = matrix.det_2x2();
        self.set_first_direction(match first_direction {
            None => None,
            Some(dir) => {
                if det < 0.0 {
                    Some(dir.opposite())
                } else if det > 0.0 {
                    Some(dir)
                } else {
                    None
                }
            }
        });
    }

    //------------------------------------------------------------------
    // Shape queries

    /// Whether the path is a closed rectangle contour made of axis-aligned
    /// lines; on success also reports whether it was explicitly closed and
    /// its winding direction.
    pub fn is_rect(&self) -> Option<(Box2D, bool, Direction)> {
        crate::shape::is_rect(self)
    }

    /// Whether the path round-trips an [`add_oval`](Self::add_oval) call.
    pub fn is_oval(&self) -> Option<Box2D> {
        match self.data.hint {
            ShapeHint::Oval { .. } => Some(self.bounds()),
            _ => None,
        }
    }

    /// Whether the path round-trips an [`add_rrect`](Self::add_rrect) call.
    pub fn is_rrect(&self) -> Option<RoundedRect> {
        match self.data.hint {
            ShapeHint::RRect { .. } => Some(crate::shape::reconstruct_rrect(self)),
            _ => None,
        }
    }

    /// Whether `(x, y)` is inside the filled path under its fill rule.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        crate::hit_test::contains(self, x, y)
    }

    /// Conservative convex-only test that the whole of `rect` is inside
    /// the filled path. `false` means "don't know".
    pub fn conservatively_contains_rect(&self, rect: &Box2D) -> bool {
        crate::shape::conservatively_contains_rect(self, rect)
    }

    //------------------------------------------------------------------
    // Interpolation

    /// Paths interpolate when their verb and weight streams match and they
    /// have the same number of points.
    pub fn is_interpolatable(&self, other: &Path) -> bool {
        self.data.points.len() == other.data.points.len()
            && self.data.verbs == other.data.verbs
            && self.data.weights == other.data.weights
    }

    /// Pointwise blend: `self * weight + other * (1 - weight)`.
    pub fn interpolate(&self, other: &Path, weight: f32) -> Option<Path> {
        if !self.is_interpolatable(other) {
            return None;
        }
        let mut out = self.clone();
        if self.data.points.is_empty() {
            return Some(out);
        }
        {
            let data = out.edit();
            for (p, q) in data.points.iter_mut().zip(other.data.points.iter()) {
                *p = (p.to_vector() * weight + q.to_vector() * (1.0 - weight)).to_point();
            }
        }
        out.dirty_after_edit();
        Some(out)
    }

    //------------------------------------------------------------------
    // Shape-append bounds transfer

    fn begin_shape_bounds(&self, rect: &Box2D) -> ShapeBoundsUpdate {
        let mut joined = sorted_box(rect);
        let has_valid_bounds = self.has_computed_bounds() && self.is_finite();
        let empty = self.is_empty();
        if has_valid_bounds && !empty {
            join_no_empty_checks(&mut joined, &self.bounds());
        }
        let leading_moves = self
            .data
            .verbs
            .iter()
            .take_while(|v| **v == Verb::Move)
            .count();
        ShapeBoundsUpdate {
            rect: joined,
            has_valid_bounds,
            empty,
            degenerate: self.data.verbs.len() == leading_moves,
        }
    }

    fn finish_shape_bounds(&mut self, update: ShapeBoundsUpdate) {
        self.set_convexity(if update.degenerate {
            Convexity::Convex
        } else {
            Convexity::Unknown
        });
        let coords = [
            update.rect.min.x,
            update.rect.min.y,
            update.rect.max.x,
            update.rect.max.y,
        ];
        if (update.empty || update.has_valid_bounds) && are_finite(&coords) {
            Arc::make_mut(&mut self.data).set_bounds(update.rect, true);
        }
    }
}

struct ShapeBoundsUpdate {
    rect: Box2D,
    has_valid_bounds: bool,
    empty: bool,
    degenerate: bool,
}

fn sorted_box(rect: &Box2D) -> Box2D {
    Box2D {
        min: rect.min.min(rect.max),
        max: rect.min.max(rect.max),
    }
}

// Path bounds promise to enclose every point, so the empty-operand
// shortcut of the usual rect union must not apply here.
fn join_no_empty_checks(dst: &mut Box2D, src: &Box2D) {
    dst.min = dst.min.min(src.min);
    dst.max = dst.max.max(src.max);
}

fn subdivide_cubic(path: &mut Path, cubic: &contour_geom::CubicBezierSegment, level: u8) {
    if level > 0 {
        let (a, b) = cubic.split(0.5);
        subdivide_cubic(path, &a, level - 1);
        subdivide_cubic(path, &b, level - 1);
    } else {
        path.cubic_bezier_to(cubic.ctrl1, cubic.ctrl2, cubic.to);
    }
}

impl Default for Path {
    fn default() -> Self {
        Path::new()
    }
}

impl Clone for Path {
    fn clone(&self) -> Self {
        Path {
            data: self.data.clone(),
            fill_rule: self.fill_rule,
            last_move_index: self.last_move_index,
            convexity: AtomicU8::new(self.convexity.load(Ordering::Relaxed)),
            first_direction: AtomicU8::new(self.first_direction.load(Ordering::Relaxed)),
        }
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        // Comparing the raw data is sufficient: the metadata caches are
        // derived from it.
        self.fill_rule == other.fill_rule && *self.data == *other.data
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        fn write_point(formatter: &mut fmt::Formatter, p: Point) -> fmt::Result {
            write!(formatter, " {:?} {:?}", p.x, p.y)
        }

        write!(formatter, "\"")?;
        for event in self.iter() {
            match event {
                PathEvent::Move { at } => {
                    write!(formatter, " M")?;
                    write_point(formatter, at)?;
                }
                PathEvent::Line { to, .. } => {
                    write!(formatter, " L")?;
                    write_point(formatter, to)?;
                }
                PathEvent::Quadratic { ctrl, to, .. } => {
                    write!(formatter, " Q")?;
                    write_point(formatter, ctrl)?;
                    write_point(formatter, to)?;
                }
                PathEvent::Conic { ctrl, to, weight, .. } => {
                    write!(formatter, " K")?;
                    write_point(formatter, ctrl)?;
                    write_point(formatter, to)?;
                    write!(formatter, " {weight:?}")?;
                }
                PathEvent::Cubic { ctrl1, ctrl2, to, .. } => {
                    write!(formatter, " C")?;
                    write_point(formatter, ctrl1)?;
                    write_point(formatter, ctrl2)?;
                    write_point(formatter, to)?;
                }
                PathEvent::Close { .. } => {
                    write!(formatter, " Z")?;
                }
            }
        }
        write!(formatter, "\"")
    }
}

//------------------------------------------------------------------
// Corner iterators for the canonical shapes.

pub(crate) struct PointCycle<const N: usize> {
    points: [Point; N],
    current: usize,
    advance: usize,
}

impl<const N: usize> PointCycle<N> {
    fn new(points: [Point; N], dir: Direction, start: usize) -> Self {
        PointCycle {
            points,
            current: start % N,
            advance: if dir == Direction::Cw { 1 } else { N - 1 },
        }
    }

    pub fn current(&self) -> Point {
        self.points[self.current]
    }

    pub fn next(&mut self) -> Point {
        self.current = (self.current + self.advance) % N;
        self.current()
    }
}

pub(crate) type RectPointIter = PointCycle<4>;
pub(crate) type OvalPointIter = PointCycle<4>;
pub(crate) type RRectPointIter = PointCycle<8>;

impl RectPointIter {
    pub fn new_rect(rect: &Box2D, dir: Direction, start: usize) -> Self {
        PointCycle::new(
            [
                point(rect.min.x, rect.min.y),
                point(rect.max.x, rect.min.y),
                point(rect.max.x, rect.max.y),
                point(rect.min.x, rect.max.y),
            ],
            dir,
            start,
        )
    }
}

impl OvalPointIter {
    pub fn new_oval(oval: &Box2D, dir: Direction, start: usize) -> Self {
        let cx = (oval.min.x + oval.max.x) * 0.5;
        let cy = (oval.min.y + oval.max.y) * 0.5;
        PointCycle::new(
            [
                point(cx, oval.min.y),
                point(oval.max.x, cy),
                point(cx, oval.max.y),
                point(oval.min.x, cy),
            ],
            dir,
            start,
        )
    }
}

impl RRectPointIter {
    pub fn new_rrect(rrect: &RoundedRect, dir: Direction, start: usize) -> Self {
        let rect = rrect.rect();
        let ul: Vector = rrect.radius(Corner::UpperLeft);
        let ur: Vector = rrect.radius(Corner::UpperRight);
        let lr: Vector = rrect.radius(Corner::LowerRight);
        let ll: Vector = rrect.radius(Corner::LowerLeft);
        PointCycle::new(
            [
                point(rect.min.x + ul.x, rect.min.y),
                point(rect.max.x - ur.x, rect.min.y),
                point(rect.max.x, rect.min.y + ur.y),
                point(rect.max.x, rect.max.y - lr.y),
                point(rect.max.x - lr.x, rect.max.y),
                point(rect.min.x + ll.x, rect.max.y),
                point(rect.min.x, rect.max.y - ll.y),
                point(rect.min.x, rect.min.y + ul.y),
            ],
            dir,
            start,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment_mask;

    fn rect(l: f32, t: f32, r: f32, b: f32) -> Box2D {
        Box2D {
            min: point(l, t),
            max: point(r, b),
        }
    }

    #[test]
    fn default_path_is_empty() {
        let path = Path::new();
        assert!(path.is_empty());
        assert_eq!(path.count_verbs(), 0);
        assert_eq!(path.count_points(), 0);
        assert_eq!(path.bounds(), Box2D::zero());
        assert!(path.is_convex());
        assert!(path.is_finite());
    }

    #[test]
    fn lone_move_is_not_empty() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        assert!(!path.is_empty());
        assert_eq!(path.count_verbs(), 1);
        assert_eq!(path.bounds(), Box2D::zero());
        assert!(path.is_convex());
        assert_eq!(path.first_direction(), None);
    }

    #[test]
    fn curve_before_move_injects_origin_move() {
        let mut path = Path::new();
        path.line_to(point(5.0, 5.0));
        assert_eq!(path.verbs(), &[Verb::Move, Verb::Line]);
        assert_eq!(path.point(0), point(0.0, 0.0));
    }

    #[test]
    fn verbs_after_close_reopen_at_move_point() {
        let mut path = Path::new();
        path.move_to(point(2.0, 3.0));
        path.line_to(point(10.0, 3.0));
        path.close();
        path.line_to(point(4.0, 4.0));
        // The close forced a re-injected move back to (2, 3).
        assert_eq!(
            path.verbs(),
            &[Verb::Move, Verb::Line, Verb::Close, Verb::Move, Verb::Line]
        );
        assert_eq!(path.point(2), point(2.0, 3.0));
    }

    #[test]
    fn close_is_a_no_op_on_empty_and_after_close() {
        let mut path = Path::new();
        path.close();
        assert!(path.is_empty());
        path.move_to(point(1.0, 1.0));
        path.line_to(point(2.0, 2.0));
        path.close();
        path.close();
        assert_eq!(path.count_verbs(), 3);
    }

    #[test]
    fn value_copies_share_until_edited() {
        let mut a = Path::new();
        a.move_to(point(0.0, 0.0));
        a.line_to(point(1.0, 0.0));
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.data, &b.data));
        assert_eq!(a, b);

        a.line_to(point(2.0, 0.0));
        assert!(!Arc::ptr_eq(&a.data, &b.data));
        assert_ne!(a, b);
        assert_eq!(b.count_verbs(), 2);
    }

    #[test]
    fn equality_requires_matching_fill_rule() {
        let mut a = Path::new();
        a.add_rect(&rect(0.0, 0.0, 1.0, 1.0), Direction::Cw, 0);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.toggle_inverse_fill_rule();
        assert_ne!(a, b);
        b.toggle_inverse_fill_rule();
        assert_eq!(a, b);
    }

    #[test]
    fn reset_and_rewind_restore_winding_fill() {
        let mut path = Path::new();
        path.set_fill_rule(FillRule::InverseEvenOdd);
        path.add_rect(&rect(0.0, 0.0, 5.0, 5.0), Direction::Cw, 0);

        let mut rewound = path.clone();
        rewound.rewind();
        assert!(rewound.is_empty());
        assert_eq!(rewound.fill_rule(), FillRule::Winding);

        path.reset();
        assert!(path.is_empty());
        assert_eq!(path.fill_rule(), FillRule::Winding);
        assert_eq!(path, Path::new());
    }

    #[test]
    fn add_rect_bounds_and_mask() {
        let r = rect(100.0, 100.0, 200.0, 200.0);
        let mut path = Path::new();
        path.add_rect(&r, Direction::Cw, 0);
        assert_eq!(path.bounds(), r);
        assert_eq!(path.segment_mask(), segment_mask::LINE);
        assert_eq!(path.count_verbs(), 5);
        assert_eq!(path.first_direction(), Some(Direction::Cw));
    }

    #[test]
    fn add_oval_round_trips() {
        let r = rect(0.0, 0.0, 100.0, 50.0);
        let mut builder = Path::builder();
        builder.add_oval(&r, Direction::Cw, 1);
        let path = builder.snapshot();

        assert_eq!(path.is_oval(), Some(r));
        assert_eq!(path.count_verbs(), 6);
        assert_eq!(
            path.verbs(),
            &[Verb::Move, Verb::Conic, Verb::Conic, Verb::Conic, Verb::Conic, Verb::Close]
        );
        for w in path.conic_weights() {
            assert!((w - ROOT_2_OVER_2).abs() < 1e-6);
        }
        assert_eq!(path.bounds(), r);
    }

    #[test]
    fn oval_hint_requires_fresh_path() {
        let mut path = Path::new();
        path.line_to(point(1.0, 1.0));
        path.add_oval(&rect(0.0, 0.0, 10.0, 10.0), Direction::Cw, 1);
        assert_eq!(path.is_oval(), None);
    }

    #[test]
    fn rrect_degenerates() {
        // All-zero radii: same verbs as a rect.
        let rr = RoundedRect::from_rect_xy(rect(0.0, 0.0, 10.0, 10.0), 0.0, 0.0);
        let mut path = Path::new();
        path.add_rrect(&rr, Direction::Cw, 6);
        let mut as_rect = Path::new();
        as_rect.add_rect(&rect(0.0, 0.0, 10.0, 10.0), Direction::Cw, 3);
        assert_eq!(path.verbs(), as_rect.verbs());
        assert_eq!(path.points(), as_rect.points());

        // Radii covering the rect: same verbs as an oval.
        let rr = RoundedRect::from_rect_xy(rect(0.0, 0.0, 10.0, 10.0), 5.0, 5.0);
        let mut path = Path::new();
        path.add_rrect(&rr, Direction::Cw, 6);
        let mut as_oval = Path::new();
        as_oval.add_oval(&rect(0.0, 0.0, 10.0, 10.0), Direction::Cw, 3);
        assert_eq!(path.verbs(), as_oval.verbs());
        assert_eq!(path.points(), as_oval.points());
    }

    #[test]
    fn rrect_round_trips() {
        let rr = RoundedRect::from_rect_xy(rect(0.0, 0.0, 40.0, 20.0), 4.0, 3.0);
        let mut path = Path::new();
        path.add_rrect(&rr, Direction::Cw, 6);
        let out = path.is_rrect().expect("should round-trip");
        assert_eq!(out.rect(), rr.rect());
        for corner in [Corner::UpperLeft, Corner::UpperRight, Corner::LowerRight, Corner::LowerLeft]
        {
            assert!((out.radius(corner) - rr.radius(corner)).length() < 1e-4);
        }
    }

    #[test]
    fn is_line_only_for_two_verb_paths() {
        let mut path = Path::new();
        path.move_to(point(1.0, 2.0));
        path.line_to(point(3.0, 4.0));
        assert_eq!(path.is_line(), Some([point(1.0, 2.0), point(3.0, 4.0)]));
        path.line_to(point(5.0, 6.0));
        assert_eq!(path.is_line(), None);
    }

    #[test]
    fn transform_identity_is_noop() {
        let mut path = Path::new();
        path.add_rect(&rect(0.0, 0.0, 4.0, 4.0), Direction::Cw, 0);
        let copy = path.transformed(&Matrix::identity());
        assert_eq!(path, copy);
    }

    #[test]
    fn transform_round_trip_is_close() {
        let mut path = Path::new();
        path.move_to(point(1.0, 2.0));
        path.cubic_bezier_to(point(3.0, 4.0), point(5.0, -1.0), point(7.0, 0.5));
        let m = Matrix::rotation(0.7).then(&Matrix::scale(2.0, 3.0));
        let there = path.transformed(&m);
        let back = there.transformed(&m.inverse().unwrap());
        for (p, q) in path.points().iter().zip(back.points().iter()) {
            assert!((*p - *q).length() < 1e-4);
        }
    }

    #[test]
    fn transform_maps_oval_hint() {
        let mut path = Path::new();
        path.add_oval(&rect(0.0, 0.0, 20.0, 10.0), Direction::Cw, 1);

        // Scale+translate keeps the hint.
        let scaled = path.transformed(&Matrix::scale(2.0, 2.0));
        assert_eq!(scaled.is_oval(), Some(rect(0.0, 0.0, 40.0, 20.0)));

        // A rotation by 45 degrees cannot stay an axis-aligned oval.
        let rotated = path.transformed(&Matrix::rotation(0.5));
        assert_eq!(rotated.is_oval(), None);
    }

    #[test]
    fn perspective_transform_promotes_quads() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.quadratic_bezier_to(point(5.0, 5.0), point(10.0, 0.0));
        let m = Matrix::row_major(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.001, 0.0, 1.0);
        let out = path.transformed(&m);
        assert_eq!(out.verbs(), &[Verb::Move, Verb::Conic]);

        let mut cubic_path = Path::new();
        cubic_path.move_to(point(0.0, 0.0));
        cubic_path.cubic_bezier_to(point(1.0, 1.0), point(2.0, -1.0), point(3.0, 0.0));
        let out = cubic_path.transformed(&m);
        assert_eq!(out.verbs().iter().filter(|v| **v == Verb::Cubic).count(), 4);
    }

    #[test]
    fn interpolate_blends_points() {
        let mut a = Path::new();
        a.move_to(point(0.0, 0.0));
        a.line_to(point(10.0, 0.0));
        let mut b = Path::new();
        b.move_to(point(0.0, 10.0));
        b.line_to(point(10.0, 10.0));
        assert!(a.is_interpolatable(&b));
        let mid = a.interpolate(&b, 0.5).unwrap();
        assert_eq!(mid.point(0), point(0.0, 5.0));

        let mut c = Path::new();
        c.move_to(point(0.0, 0.0));
        c.quadratic_bezier_to(point(1.0, 1.0), point(2.0, 0.0));
        assert!(a.interpolate(&c, 0.5).is_none());
    }

    #[test]
    fn reverse_add_path_reverses_contours() {
        let mut src = Path::new();
        src.move_to(point(0.0, 0.0));
        src.line_to(point(10.0, 0.0));
        src.line_to(point(10.0, 10.0));

        let mut dst = Path::new();
        dst.reverse_add_path(&src);
        assert_eq!(dst.verbs(), &[Verb::Move, Verb::Line, Verb::Line]);
        assert_eq!(dst.point(0), point(10.0, 10.0));
        assert_eq!(dst.point(2), point(0.0, 0.0));
    }

    #[test]
    fn add_path_extend_draws_a_bridge_line() {
        let mut a = Path::new();
        a.move_to(point(0.0, 0.0));
        a.line_to(point(10.0, 0.0));

        let mut b = Path::new();
        b.move_to(point(20.0, 0.0));
        b.line_to(point(30.0, 0.0));

        let mut joined = a.clone();
        joined.add_path(&b, 0.0, 0.0, AddPathMode::Extend);
        assert_eq!(
            joined.verbs(),
            &[Verb::Move, Verb::Line, Verb::Line, Verb::Line]
        );

        let mut appended = a.clone();
        appended.add_path(&b, 0.0, 0.0, AddPathMode::Append);
        assert_eq!(
            appended.verbs(),
            &[Verb::Move, Verb::Line, Verb::Move, Verb::Line]
        );
    }

    #[test]
    fn non_finite_coordinates_poison_the_path() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(f32::NAN, 1.0));
        assert!(!path.is_finite());
        assert_eq!(path.bounds(), Box2D::zero());
        // Iteration short-circuits to done.
        assert_eq!(path.iter().count(), 0);
    }

    #[test]
    fn streams_stay_consistent() {
        // Every verb advances the point stream by its own count, conics
        // own exactly one weight each, and the bounds cover every stored
        // point.
        let mut path = Path::new();
        path.move_to(point(1.0, 1.0));
        path.line_to(point(10.0, 1.0));
        path.conic_to(point(12.0, 4.0), point(10.0, 8.0), 0.7);
        path.quadratic_bezier_to(point(6.0, 12.0), point(2.0, 8.0));
        path.cubic_bezier_to(point(0.0, 6.0), point(0.0, 3.0), point(1.0, 1.0));
        path.close();
        path.add_oval(&rect(20.0, 20.0, 30.0, 26.0), Direction::Ccw, 2);

        let advance: usize = path.verbs().iter().map(|v| v.point_advance()).sum();
        assert_eq!(advance, path.count_points());
        let conics = path.verbs().iter().filter(|v| **v == Verb::Conic).count();
        assert_eq!(conics, path.conic_weights().len());
        assert_eq!(path.verbs()[0], Verb::Move);

        let bounds = path.bounds();
        for p in path.points() {
            assert!(bounds.min.x <= p.x && p.x <= bounds.max.x);
            assert!(bounds.min.y <= p.y && p.y <= bounds.max.y);
        }

        // Equal paths agree on every derived quantity.
        let copy = path.clone();
        assert_eq!(path, copy);
        assert_eq!(path.bounds(), copy.bounds());
        assert_eq!(path.segment_mask(), copy.segment_mask());
    }

    #[test]
    fn set_last_point_edits_in_place() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(5.0, 5.0));
        path.set_last_point(point(7.0, 7.0));
        assert_eq!(path.last_point(), Some(point(7.0, 7.0)));

        let mut empty = Path::new();
        empty.set_last_point(point(3.0, 3.0));
        assert_eq!(empty.verbs(), &[Verb::Move]);
    }
}

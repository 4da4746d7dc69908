//! The per-segment stroke generator.
//!
//! Maintains two walls while walking a contour: `outer` carries the final
//! answer and `inner` the opposite offset, reversed and appended when the
//! contour finishes. Offset curves are emitted as quadratics whose
//! fidelity is checked against a ray through the source curve's midpoint;
//! failing spans are split in half, under a hard recursion cap so
//! pathological geometry degrades to lines instead of spinning.

use crate::math::{Matrix, Point, Vector};
use crate::path::builder::Builder;
use crate::path::iterator::ContourIter;
use crate::path::{Direction, Path, PathEvent};
use crate::{LineCap, LineJoin, StrokeParams};

use contour_path::geom::conic::{build_unit_arc, RotationDirection};
use contour_path::geom::scalar::{find_unit_quad_roots, nearly_zero, NEARLY_ZERO, ROOT_2_OVER_2};
use contour_path::geom::utils::{normalize, rotate_ccw, rotate_cw, set_length};
use contour_path::geom::{ConicSegment, CubicBezierSegment, QuadraticBezierSegment};

use arrayvec::ArrayVec;

// Recursion budgets per curve family, three times the worst depths seen on
// real content. Extreme widths (e.g. (0,1)(1,6)(0,3) width 5e7) otherwise
// recurse to the point of failure.
const TANGENT_RECURSIVE_LIMIT: i32 = 5 * 3;
const CUBIC_RECURSIVE_LIMIT: i32 = 26 * 3;
const CONIC_RECURSIVE_LIMIT: i32 = 11 * 3;
const QUAD_RECURSIVE_LIMIT: i32 = 11 * 3;

#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
enum ReductionType {
    Point,       // all curve points are practically identical
    Line,        // the control point is on the line between the ends
    Quad,        // the control point is outside the line between the ends
    Degenerate,  // the control point is on the line but outside the ends
    Degenerate2, // two control points are on the line but outside the ends
    Degenerate3, // three areas of max curvature found (for cubics)
}

#[derive(Copy, Clone, PartialEq, Debug)]
enum StrokeType {
    Outer = 1, // sign-opposite values flip the perpendicular axis
    Inner = -1,
}

#[derive(Copy, Clone, PartialEq, Debug)]
enum ResultType {
    Split,      // the caller should split the quad stroke in two
    Degenerate, // the caller should add a line
    Quad,       // the caller should (continue to try to) add a quad stroke
}

#[derive(Copy, Clone, PartialEq, Debug)]
enum IntersectRayType {
    CtrlPt,
    ResultType,
}

pub(crate) struct PathStroker {
    radius: f32,
    res_scale: f32,
    inv_res_scale: f32,
    inv_res_scale_squared: f32,

    first_normal: Vector,
    prev_normal: Vector,
    first_unit_normal: Vector,
    prev_unit_normal: Vector,

    // on the original path
    first_pt: Point,
    prev_pt: Point,

    first_outer_pt: Point,
    first_outer_pt_index_in_contour: usize,
    segment_count: i32,
    prev_is_line: bool,
    can_ignore_center: bool,

    // the params that started the contour, for the join a close emits
    first_params: StrokeParams,
    // the params of the previous segment, for contour breaks
    prev_params: StrokeParams,

    // outer is our working answer, inner is temp
    inner: Builder,
    outer: Builder,
    cusper: Path,

    stroke_type: StrokeType,

    recursion_depth: i32, // track stack depth to abort if numerics run amok
    found_tangents: bool, // do less work until tangents meet (cubic)
    join_completed: bool, // previous join was not degenerate
}

impl PathStroker {
    pub fn new(radius: f32, res_scale: f32, can_ignore_center: bool) -> Self {
        // The '4' matches the fill scan converter's error term.
        let inv_res_scale = 1.0 / (res_scale * 4.0);
        PathStroker {
            radius,
            res_scale,
            inv_res_scale,
            inv_res_scale_squared: inv_res_scale * inv_res_scale,

            first_normal: Vector::zero(),
            prev_normal: Vector::zero(),
            first_unit_normal: Vector::zero(),
            prev_unit_normal: Vector::zero(),

            first_pt: Point::zero(),
            prev_pt: Point::zero(),

            first_outer_pt: Point::zero(),
            first_outer_pt_index_in_contour: 0,
            segment_count: -1,
            prev_is_line: false,
            can_ignore_center,

            first_params: StrokeParams::default(),
            prev_params: StrokeParams::default(),

            inner: Builder::new(),
            outer: Builder::new(),
            cusper: Path::new(),

            stroke_type: StrokeType::Outer,

            recursion_depth: 0,
            found_tangents: false,
            join_completed: false,
        }
    }

    pub fn has_only_move_to(&self) -> bool {
        self.segment_count == 0
    }

    pub fn move_to_pt(&self) -> Point {
        self.first_pt
    }

    pub fn is_current_contour_empty(&self) -> bool {
        self.inner.is_zero_length_since_point(0)
            && self
                .outer
                .is_zero_length_since_point(self.first_outer_pt_index_in_contour)
    }

    pub fn move_to(&mut self, p: Point) {
        if self.segment_count > 0 {
            let params = self.prev_params;
            self.finish_contour(false, false, &params);
        }
        self.segment_count = 0;
        self.first_pt = p;
        self.prev_pt = p;
        self.join_completed = false;
    }

    pub fn close(&mut self, is_line: bool, params: &StrokeParams) {
        self.finish_contour(true, is_line, params);
    }

    pub fn finish(&mut self, is_line: bool, params: &StrokeParams) -> Path {
        self.finish_contour(false, is_line, params);
        self.outer.detach()
    }

    pub fn line_to(&mut self, p: Point, params: &StrokeParams, iter: Option<&ContourIter>) {
        let teeny_line = points_within_dist(self.prev_pt, p, NEARLY_ZERO * self.inv_res_scale);
        if params.cap == LineCap::Butt && teeny_line {
            return;
        }
        if teeny_line
            && (self.join_completed || iter.map(has_valid_tangent) == Some(true))
        {
            return;
        }

        let (normal, unit_normal) = match self.pre_join_to(p, true, params) {
            Some(n) => n,
            None => return,
        };

        self.outer.line_to(p + normal);
        self.inner.line_to(p - normal);

        self.post_join_to(p, normal, unit_normal, params);
    }

    pub fn quad_to(&mut self, p1: Point, p2: Point, params: &StrokeParams) {
        let quad = QuadraticBezierSegment {
            from: self.prev_pt,
            ctrl: p1,
            to: p2,
        };
        let (reduction, reduction_type) = check_quad_linear(&quad);
        if reduction_type == ReductionType::Point {
            // Degenerate to a zero-length line so square and round caps
            // still produce geometry.
            self.line_to(p2, params, None);
            return;
        }
        if reduction_type == ReductionType::Line {
            self.line_to(p2, params, None);
            return;
        }
        if reduction_type == ReductionType::Degenerate {
            // The quad doubles back on its baseline: draw through the point
            // of max curvature with round joins to cover the turn.
            let round = StrokeParams {
                join: LineJoin::Round,
                ..*params
            };
            self.line_to(reduction, params, None);
            self.line_to(p2, &round, None);
            return;
        }

        debug_assert_eq!(reduction_type, ReductionType::Quad);

        let (normal_ab, unit_ab) = match self.pre_join_to(p1, false, params) {
            Some(n) => n,
            None => {
                self.line_to(p2, params, None);
                return;
            }
        };

        let mut quad_points = QuadConstruct::default();
        self.init_quad(StrokeType::Outer, 0.0, 1.0, &mut quad_points);
        self.quad_stroke(&quad, &mut quad_points);
        self.init_quad(StrokeType::Inner, 0.0, 1.0, &mut quad_points);
        self.quad_stroke(&quad, &mut quad_points);

        let (normal_bc, unit_bc) = self.quad_end_normals(quad.ctrl, quad.to, normal_ab, unit_ab);
        self.post_join_to(p2, normal_bc, unit_bc, params);
    }

    pub fn conic_to(&mut self, p1: Point, p2: Point, weight: f32, params: &StrokeParams) {
        let conic = ConicSegment {
            from: self.prev_pt,
            ctrl: p1,
            to: p2,
            w: weight,
        };
        let (reduction, reduction_type) = check_conic_linear(&conic);
        if reduction_type == ReductionType::Point {
            self.line_to(p2, params, None);
            return;
        }
        if reduction_type == ReductionType::Line {
            self.line_to(p2, params, None);
            return;
        }
        if reduction_type == ReductionType::Degenerate {
            let round = StrokeParams {
                join: LineJoin::Round,
                ..*params
            };
            self.line_to(reduction, params, None);
            self.line_to(p2, &round, None);
            return;
        }

        debug_assert_eq!(reduction_type, ReductionType::Quad);

        let (normal_ab, unit_ab) = match self.pre_join_to(p1, false, params) {
            Some(n) => n,
            None => {
                self.line_to(p2, params, None);
                return;
            }
        };

        let mut quad_points = QuadConstruct::default();
        self.init_quad(StrokeType::Outer, 0.0, 1.0, &mut quad_points);
        self.conic_stroke(&conic, &mut quad_points);
        self.init_quad(StrokeType::Inner, 0.0, 1.0, &mut quad_points);
        self.conic_stroke(&conic, &mut quad_points);

        let (normal_bc, unit_bc) = self.quad_end_normals(conic.ctrl, conic.to, normal_ab, unit_ab);
        self.post_join_to(p2, normal_bc, unit_bc, params);
    }

    pub fn cubic_to(&mut self, p1: Point, p2: Point, p3: Point, params: &StrokeParams) {
        let cubic = CubicBezierSegment {
            from: self.prev_pt,
            ctrl1: p1,
            ctrl2: p2,
            to: p3,
        };
        let mut reduction = [Point::zero(); 3];
        let mut tangent_pt = Point::zero();
        let reduction_type = check_cubic_linear(&cubic, &mut reduction, Some(&mut tangent_pt));
        if reduction_type == ReductionType::Point {
            self.line_to(p3, params, None);
            return;
        }
        if reduction_type == ReductionType::Line {
            self.line_to(p3, params, None);
            return;
        }
        if (ReductionType::Degenerate..=ReductionType::Degenerate3).contains(&reduction_type) {
            let round = StrokeParams {
                join: LineJoin::Round,
                ..*params
            };
            self.line_to(reduction[0], params, None);
            if reduction_type >= ReductionType::Degenerate2 {
                self.line_to(reduction[1], &round, None);
            }
            if reduction_type == ReductionType::Degenerate3 {
                self.line_to(reduction[2], &round, None);
            }
            self.line_to(p3, &round, None);
            return;
        }

        debug_assert_eq!(reduction_type, ReductionType::Quad);

        let (normal_ab, unit_ab) = match self.pre_join_to(tangent_pt, false, params) {
            Some(n) => n,
            None => {
                self.line_to(p3, params, None);
                return;
            }
        };

        // Stroke between inflections so each span has one curvature sign.
        let inflections = cubic.inflections();
        let mut last_t = 0.0;
        for index in 0..=inflections.len() {
            let next_t = inflections.get(index).copied().unwrap_or(1.0);
            let mut quad_points = QuadConstruct::default();
            self.init_quad(StrokeType::Outer, last_t, next_t, &mut quad_points);
            self.cubic_stroke(&cubic, &mut quad_points);
            self.init_quad(StrokeType::Inner, last_t, next_t, &mut quad_points);
            self.cubic_stroke(&cubic, &mut quad_points);
            last_t = next_t;
        }

        // A cusp's walls pinch to nothing; a disc at the cusp keeps the
        // stroke connected.
        if let Some(cusp_t) = cubic.cusp_t() {
            let cusp = cubic.sample(cusp_t);
            self.cusper.add_circle(cusp.x, cusp.y, self.radius, Direction::Cw);
        }

        // Emit the join even if one stroke succeeded but the other failed;
        // this avoids reversing an inner stroke with a partial path
        // followed by another move.
        let (normal_cd, unit_cd) = self.cubic_end_normals(&cubic, normal_ab, unit_ab);
        self.post_join_to(p3, normal_cd, unit_cd, params);
    }

    //------------------------------------------------------------------
    // Contour plumbing

    fn pre_join_to(
        &mut self,
        p: Point,
        curr_is_line: bool,
        params: &StrokeParams,
    ) -> Option<(Vector, Vector)> {
        debug_assert!(self.segment_count >= 0);

        let prev = self.prev_pt;
        let (normal, unit_normal) = match normal_pair(prev, p, self.res_scale, self.radius) {
            Some(pair) => pair,
            None => {
                if params.cap == LineCap::Butt {
                    return None;
                }
                // Square and round caps draw even for zero-length
                // segments; with no direction to offset along, default to
                // upright.
                (Vector::new(self.radius, 0.0), Vector::new(1.0, 0.0))
            }
        };

        if self.segment_count == 0 {
            self.first_normal = normal;
            self.first_unit_normal = unit_normal;
            self.first_outer_pt = prev + normal;
            self.first_params = *params;

            self.outer.move_to(self.first_outer_pt);
            self.inner.move_to(prev - normal);
        } else {
            emit_join(
                params,
                self.prev_unit_normal,
                self.prev_pt,
                unit_normal,
                self.radius,
                self.prev_is_line,
                curr_is_line,
                Walls {
                    inner: &mut self.inner,
                    outer: &mut self.outer,
                },
            );
        }
        self.prev_is_line = curr_is_line;
        Some((normal, unit_normal))
    }

    fn post_join_to(&mut self, p: Point, normal: Vector, unit_normal: Vector, params: &StrokeParams) {
        self.join_completed = true;
        self.prev_pt = p;
        self.prev_unit_normal = unit_normal;
        self.prev_normal = normal;
        self.prev_params = *params;
        self.segment_count += 1;
    }

    fn finish_contour(&mut self, close: bool, curr_is_line: bool, params: &StrokeParams) {
        if self.segment_count > 0 {
            if close {
                let first_params = self.first_params;
                emit_join(
                    &first_params,
                    self.prev_unit_normal,
                    self.prev_pt,
                    self.first_unit_normal,
                    self.radius,
                    self.prev_is_line,
                    curr_is_line,
                    Walls {
                        inner: &mut self.inner,
                        outer: &mut self.outer,
                    },
                );
                self.outer.close();

                if self.can_ignore_center {
                    // Keep whichever wall encloses the other; the interior
                    // is filled anyway.
                    if self.inner.bounds().contains_box(&self.outer.bounds()) {
                        core::mem::swap(&mut self.inner, &mut self.outer);
                    }
                } else {
                    // Add the inner wall as its own (counter-wound)
                    // contour.
                    let pt = self.inner.last_point().unwrap_or_else(Point::zero);
                    self.outer.move_to(pt);
                    self.outer.reverse_path_to(&self.inner.snapshot());
                    self.outer.close();
                }
            } else {
                // Cap the end...
                let inner_last = self.inner.last_point().unwrap_or_else(Point::zero);
                let inner_snapshot = self.inner.snapshot();
                emit_cap(
                    params.cap,
                    self.prev_pt,
                    self.prev_normal,
                    inner_last,
                    curr_is_line,
                    &mut self.outer,
                );
                self.outer.reverse_path_to(&inner_snapshot);

                // ... and the start.
                let first_cap = self.first_params.cap;
                emit_cap(
                    first_cap,
                    self.first_pt,
                    -self.first_normal,
                    self.first_outer_pt,
                    self.prev_is_line,
                    &mut self.outer,
                );
                self.outer.close();
            }

            if !self.cusper.is_empty() {
                self.outer.add_path(
                    &self.cusper,
                    0.0,
                    0.0,
                    contour_path::path::AddPathMode::Append,
                );
                self.cusper.reset();
            }
        }

        // The inner wall is reused per contour; rewind keeps its storage.
        self.inner.rewind();
        self.segment_count = -1;
        self.first_outer_pt_index_in_contour = self.outer.count_points();
    }

    //------------------------------------------------------------------
    // Quadratic offset construction

    fn init_quad(&mut self, stroke_type: StrokeType, start: f32, end: f32, quad_points: &mut QuadConstruct) {
        self.stroke_type = stroke_type;
        self.found_tangents = false;
        quad_points.init(start, end);
    }

    fn quad_stroke(&mut self, quad: &QuadraticBezierSegment, quad_points: &mut QuadConstruct) -> bool {
        let result_type = self.compare_quad_quad(quad, quad_points);
        if result_type == ResultType::Quad {
            let stroke = &quad_points.quad;
            self.wall().quadratic_bezier_to(stroke[1], stroke[2]);
            return true;
        }
        if result_type == ResultType::Degenerate {
            self.add_degenerate_line(quad_points);
            return true;
        }

        self.recursion_depth += 1;
        if self.recursion_depth > QUAD_RECURSIVE_LIMIT {
            return false; // just abort if numerics run amok
        }

        let mut half = QuadConstruct::default();
        half.init_with_start(quad_points);
        if !self.quad_stroke(quad, &mut half) {
            return false;
        }
        half.init_with_end(quad_points);
        if !self.quad_stroke(quad, &mut half) {
            return false;
        }
        self.recursion_depth -= 1;
        true
    }

    fn conic_stroke(&mut self, conic: &ConicSegment, quad_points: &mut QuadConstruct) -> bool {
        let result_type = self.compare_quad_conic(conic, quad_points);
        if result_type == ResultType::Quad {
            let stroke = &quad_points.quad;
            self.wall().quadratic_bezier_to(stroke[1], stroke[2]);
            return true;
        }
        if result_type == ResultType::Degenerate {
            self.add_degenerate_line(quad_points);
            return true;
        }

        self.recursion_depth += 1;
        if self.recursion_depth > CONIC_RECURSIVE_LIMIT {
            return false;
        }

        let mut half = QuadConstruct::default();
        half.init_with_start(quad_points);
        if !self.conic_stroke(conic, &mut half) {
            return false;
        }
        half.init_with_end(quad_points);
        if !self.conic_stroke(conic, &mut half) {
            return false;
        }
        self.recursion_depth -= 1;
        true
    }

    fn cubic_stroke(&mut self, cubic: &CubicBezierSegment, quad_points: &mut QuadConstruct) -> bool {
        if !self.found_tangents {
            let result_type = self.tangents_meet(cubic, quad_points);
            if result_type != ResultType::Quad {
                let ok = points_within_dist(
                    quad_points.quad[0],
                    quad_points.quad[2],
                    self.inv_res_scale,
                );
                if (result_type == ResultType::Degenerate || ok)
                    && self.cubic_mid_on_line(cubic, quad_points)
                {
                    self.add_degenerate_line(quad_points);
                    return true;
                }
            } else {
                self.found_tangents = true;
            }
        }

        if self.found_tangents {
            let result_type = self.compare_quad_cubic(cubic, quad_points);
            if result_type == ResultType::Quad {
                let stroke = &quad_points.quad;
                self.wall().quadratic_bezier_to(stroke[1], stroke[2]);
                return true;
            }
            if result_type == ResultType::Degenerate && !quad_points.opposite_tangents {
                self.add_degenerate_line(quad_points);
                return true;
            }
        }

        if !quad_points.quad[2].x.is_finite() || !quad_points.quad[2].y.is_finite() {
            return false; // just abort if the projected quad isn't representable
        }

        self.recursion_depth += 1;
        let limit = if self.found_tangents {
            CUBIC_RECURSIVE_LIMIT
        } else {
            TANGENT_RECURSIVE_LIMIT
        };
        if self.recursion_depth > limit {
            return false;
        }

        let mut half = QuadConstruct::default();
        if !half.init_with_start(quad_points) {
            self.add_degenerate_line(quad_points);
            self.recursion_depth -= 1;
            return true;
        }
        if !self.cubic_stroke(cubic, &mut half) {
            return false;
        }
        if !half.init_with_end(quad_points) {
            self.add_degenerate_line(quad_points);
            self.recursion_depth -= 1;
            return true;
        }
        if !self.cubic_stroke(cubic, &mut half) {
            return false;
        }
        self.recursion_depth -= 1;
        true
    }

    fn wall(&mut self) -> &mut Builder {
        if self.stroke_type == StrokeType::Outer {
            &mut self.outer
        } else {
            &mut self.inner
        }
    }

    fn add_degenerate_line(&mut self, quad_points: &QuadConstruct) {
        let to = quad_points.quad[2];
        self.wall().line_to(to);
    }

    fn quad_end_normals(
        &self,
        ctrl: Point,
        to: Point,
        normal_ab: Vector,
        unit_ab: Vector,
    ) -> (Vector, Vector) {
        match normal_pair(ctrl, to, self.res_scale, self.radius) {
            Some(pair) => pair,
            None => (normal_ab, unit_ab),
        }
    }

    fn cubic_end_normals(
        &self,
        cubic: &CubicBezierSegment,
        normal_ab: Vector,
        unit_ab: Vector,
    ) -> (Vector, Vector) {
        let mut ab = cubic.ctrl1 - cubic.from;
        let mut cd = cubic.to - cubic.ctrl2;

        let mut degenerate_ab = degenerate_vector(ab);
        let mut degenerate_cd = degenerate_vector(cd);

        if degenerate_ab && degenerate_cd {
            return (normal_ab, unit_ab);
        }
        if degenerate_ab {
            ab = cubic.ctrl2 - cubic.from;
            degenerate_ab = degenerate_vector(ab);
        }
        if degenerate_cd {
            cd = cubic.to - cubic.ctrl1;
            degenerate_cd = degenerate_vector(cd);
        }
        if degenerate_ab || degenerate_cd {
            return (normal_ab, unit_ab);
        }

        match vector_normal_pair(cd, self.radius) {
            Some(pair) => pair,
            None => (normal_ab, unit_ab),
        }
    }

    //------------------------------------------------------------------
    // Fidelity checks

    fn compare_quad_quad(
        &self,
        quad: &QuadraticBezierSegment,
        quad_points: &mut QuadConstruct,
    ) -> ResultType {
        // Get the quadratic approximation of the stroke.
        if !quad_points.start_set {
            let mut quad_start_pt = Point::zero();
            self.quad_perp_ray(
                quad,
                quad_points.start_t,
                &mut quad_start_pt,
                0,
                true,
                quad_points,
            );
            quad_points.start_set = true;
        }
        if !quad_points.end_set {
            let mut quad_end_pt = Point::zero();
            self.quad_perp_ray(quad, quad_points.end_t, &mut quad_end_pt, 2, false, quad_points);
            quad_points.end_set = true;
        }

        let result_type = self.intersect_ray(IntersectRayType::CtrlPt, quad_points);
        if result_type != ResultType::Quad {
            return result_type;
        }

        // Project a ray from the curve to the stroke.
        let mut ray0 = Point::zero();
        let mut ray1 = Point::zero();
        self.quad_ray(quad, quad_points.mid_t, &mut ray1, &mut ray0);
        let stroke = quad_points.quad;
        self.stroke_close_enough(&stroke, &[ray0, ray1], quad_points)
    }

    fn compare_quad_conic(&self, conic: &ConicSegment, quad_points: &mut QuadConstruct) -> ResultType {
        self.conic_quad_ends(conic, quad_points);
        let result_type = self.intersect_ray(IntersectRayType::CtrlPt, quad_points);
        if result_type != ResultType::Quad {
            return result_type;
        }

        let mut ray0 = Point::zero();
        let mut ray1 = Point::zero();
        self.conic_ray(conic, quad_points.mid_t, &mut ray1, &mut ray0);
        let stroke = quad_points.quad;
        self.stroke_close_enough(&stroke, &[ray0, ray1], quad_points)
    }

    fn compare_quad_cubic(&self, cubic: &CubicBezierSegment, quad_points: &mut QuadConstruct) -> ResultType {
        self.cubic_quad_ends(cubic, quad_points);
        let result_type = self.intersect_ray(IntersectRayType::CtrlPt, quad_points);
        if result_type != ResultType::Quad {
            return result_type;
        }

        let mut ray0 = Point::zero();
        let mut ray1 = Point::zero();
        self.cubic_ray(cubic, quad_points.mid_t, &mut ray1, &mut ray0);
        let stroke = quad_points.quad;
        self.stroke_close_enough(&stroke, &[ray0, ray1], quad_points)
    }

    fn tangents_meet(&self, cubic: &CubicBezierSegment, quad_points: &mut QuadConstruct) -> ResultType {
        self.cubic_quad_ends(cubic, quad_points);
        self.intersect_ray(IntersectRayType::ResultType, quad_points)
    }

    fn cubic_quad_ends(&self, cubic: &CubicBezierSegment, quad_points: &mut QuadConstruct) {
        if !quad_points.start_set {
            let mut cubic_start_pt = Point::zero();
            self.cubic_perp_ray(
                cubic,
                quad_points.start_t,
                &mut cubic_start_pt,
                0,
                true,
                quad_points,
            );
            quad_points.start_set = true;
        }
        if !quad_points.end_set {
            let mut cubic_end_pt = Point::zero();
            self.cubic_perp_ray(
                cubic,
                quad_points.end_t,
                &mut cubic_end_pt,
                2,
                false,
                quad_points,
            );
            quad_points.end_set = true;
        }
    }

    fn conic_quad_ends(&self, conic: &ConicSegment, quad_points: &mut QuadConstruct) {
        if !quad_points.start_set {
            let mut conic_start_pt = Point::zero();
            self.conic_perp_ray(
                conic,
                quad_points.start_t,
                &mut conic_start_pt,
                0,
                true,
                quad_points,
            );
            quad_points.start_set = true;
        }
        if !quad_points.end_set {
            let mut conic_end_pt = Point::zero();
            self.conic_perp_ray(
                conic,
                quad_points.end_t,
                &mut conic_end_pt,
                2,
                false,
                quad_points,
            );
            quad_points.end_set = true;
        }
    }

    fn cubic_mid_on_line(&self, cubic: &CubicBezierSegment, quad_points: &QuadConstruct) -> bool {
        let mut stroke_mid = Point::zero();
        let mut cubic_mid_pt = Point::zero();
        let mut dxy = cubic_tangent(cubic, quad_points.mid_t, &mut cubic_mid_pt);
        self.set_ray_pt(cubic_mid_pt, &mut dxy, &mut stroke_mid);
        let dist = pt_to_line(stroke_mid, quad_points.quad[0], quad_points.quad[2]);
        dist < self.inv_res_scale_squared
    }

    // Given a point on the curve and its derivative, scale the derivative
    // by the radius and compute the perpendicular point.
    fn set_ray_pt(&self, tp: Point, dxy: &mut Vector, on_p: &mut Point) {
        if let Some(scaled) = set_length(*dxy, self.radius) {
            *dxy = scaled;
        } else {
            *dxy = Vector::new(self.radius, 0.0);
        }
        let axis_flip = self.stroke_type as i32 as f32; // outer and inner offset opposite ways
        on_p.x = tp.x + axis_flip * dxy.y;
        on_p.y = tp.y - axis_flip * dxy.x;
    }

    fn quad_ray(&self, quad: &QuadraticBezierSegment, t: f32, t_pt: &mut Point, on_pt: &mut Point) {
        let mut dxy = quad_tangent(quad, t, t_pt);
        self.set_ray_pt(*t_pt, &mut dxy, on_pt);
    }

    fn conic_ray(&self, conic: &ConicSegment, t: f32, t_pt: &mut Point, on_pt: &mut Point) {
        let mut dxy = conic_tangent(conic, t, t_pt);
        self.set_ray_pt(*t_pt, &mut dxy, on_pt);
    }

    fn cubic_ray(&self, cubic: &CubicBezierSegment, t: f32, t_pt: &mut Point, on_pt: &mut Point) {
        let mut dxy = cubic_tangent(cubic, t, t_pt);
        self.set_ray_pt(*t_pt, &mut dxy, on_pt);
    }

    // Computes one end (quad[slot]) and its tangent point of the stroke
    // quad under construction.
    fn quad_perp_ray(
        &self,
        quad: &QuadraticBezierSegment,
        t: f32,
        t_pt: &mut Point,
        slot: usize,
        is_start: bool,
        quad_points: &mut QuadConstruct,
    ) {
        let mut dxy = quad_tangent(quad, t, t_pt);
        let mut on_pt = Point::zero();
        self.set_ray_pt(*t_pt, &mut dxy, &mut on_pt);
        quad_points.quad[slot] = on_pt;
        let tangent = Point::new(on_pt.x + dxy.x, on_pt.y + dxy.y);
        if is_start {
            quad_points.tangent_start = tangent;
        } else {
            quad_points.tangent_end = tangent;
        }
    }

    fn conic_perp_ray(
        &self,
        conic: &ConicSegment,
        t: f32,
        t_pt: &mut Point,
        slot: usize,
        is_start: bool,
        quad_points: &mut QuadConstruct,
    ) {
        let mut dxy = conic_tangent(conic, t, t_pt);
        let mut on_pt = Point::zero();
        self.set_ray_pt(*t_pt, &mut dxy, &mut on_pt);
        quad_points.quad[slot] = on_pt;
        let tangent = Point::new(on_pt.x + dxy.x, on_pt.y + dxy.y);
        if is_start {
            quad_points.tangent_start = tangent;
        } else {
            quad_points.tangent_end = tangent;
        }
    }

    fn cubic_perp_ray(
        &self,
        cubic: &CubicBezierSegment,
        t: f32,
        t_pt: &mut Point,
        slot: usize,
        is_start: bool,
        quad_points: &mut QuadConstruct,
    ) {
        let mut dxy = cubic_tangent(cubic, t, t_pt);
        let mut on_pt = Point::zero();
        self.set_ray_pt(*t_pt, &mut dxy, &mut on_pt);
        quad_points.quad[slot] = on_pt;
        let tangent = Point::new(on_pt.x + dxy.x, on_pt.y + dxy.y);
        if is_start {
            quad_points.tangent_start = tangent;
        } else {
            quad_points.tangent_end = tangent;
        }
    }

    fn stroke_close_enough(
        &self,
        stroke: &[Point; 3],
        ray: &[Point; 2],
        quad_points: &mut QuadConstruct,
    ) -> ResultType {
        let quad = QuadraticBezierSegment {
            from: stroke[0],
            ctrl: stroke[1],
            to: stroke[2],
        };
        let stroke_mid = quad.sample(0.5);
        // Measure the distance from the curve to the quad-stroke midpoint.
        if points_within_dist(ray[0], stroke_mid, self.inv_res_scale) {
            if sharp_angle(&quad_points.quad) {
                return ResultType::Split;
            }
            return ResultType::Quad;
        }

        // Measure the distance to the quad's bounds (quick reject).
        if !pt_in_quad_bounds(stroke, ray[0], self.inv_res_scale) {
            // If far, subdivide.
            return ResultType::Split;
        }

        // Measure the curve ray distance to the quad-stroke.
        let roots = intersect_quad_ray(ray, &quad);
        if roots.len() != 1 {
            return ResultType::Split;
        }

        let quad_pt = quad.sample(roots[0]);
        let error = self.inv_res_scale * (1.0 - (roots[0] - 0.5).abs() * 2.0);
        if points_within_dist(ray[0], quad_pt, error) {
            if sharp_angle(&quad_points.quad) {
                return ResultType::Split;
            }
            return ResultType::Quad;
        }

        ResultType::Split
    }

    // Finds the intersection of the stroke tangents to construct a stroke
    // quad. Returns whether the stroke is a degenerate (a line), a quad, or
    // must be split; optionally computes the quad's control point.
    fn intersect_ray(&self, ray_type: IntersectRayType, quad_points: &mut QuadConstruct) -> ResultType {
        let start = quad_points.quad[0];
        let end = quad_points.quad[2];
        let a_len = quad_points.tangent_start - start;
        let b_len = quad_points.tangent_end - end;

        // The slopes match when the denominator (their cross product)
        // vanishes.
        let denom = a_len.cross(b_len);
        if denom == 0.0 || !denom.is_finite() {
            quad_points.opposite_tangents = a_len.dot(b_len) < 0.0;
            return ResultType::Degenerate;
        }

        quad_points.opposite_tangents = false;
        let ab0 = start - end;
        let mut numer_a = b_len.cross(ab0);
        let numer_b = a_len.cross(ab0);
        if (numer_a >= 0.0) == (numer_b >= 0.0) {
            // The control point would fall outside the quad's ends. If the
            // perpendicular distances from the quad points to the opposite
            // tangent line are small, a straight line is good enough.
            let dist1 = pt_to_line(start, end, quad_points.tangent_end);
            let dist2 = pt_to_line(end, start, quad_points.tangent_start);
            if dist1.max(dist2) <= self.inv_res_scale_squared {
                return ResultType::Degenerate;
            }
            return ResultType::Split;
        }

        // Check whether the denominator is teeny relative to the
        // numerator: if the offset by one will be lost, the ratio is too
        // large to divide.
        numer_a /= denom;
        let valid_divide = numer_a > numer_a - 1.0;
        if valid_divide {
            if ray_type == IntersectRayType::CtrlPt {
                // The intersection of the tangents need not be on the
                // tangent segment, so 0 <= numer_a <= 1 need not hold.
                quad_points.quad[1] = Point::new(
                    start.x * (1.0 - numer_a) + quad_points.tangent_start.x * numer_a,
                    start.y * (1.0 - numer_a) + quad_points.tangent_start.y * numer_a,
                );
            }
            return ResultType::Quad;
        }

        quad_points.opposite_tangents = a_len.dot(b_len) < 0.0;
        // The lines are parallel: a straight line is good enough.
        ResultType::Degenerate
    }
}

//------------------------------------------------------------------
// Wall pairs, caps and joins

struct Walls<'a> {
    inner: &'a mut Builder,
    outer: &'a mut Builder,
}

impl Walls<'_> {
    // Swap which wall is "outer" for the scope of a join; swapping the
    // references, not the builders.
    fn swap(&mut self) {
        core::mem::swap(&mut self.inner, &mut self.outer);
    }
}

fn emit_cap(
    cap: LineCap,
    pivot: Point,
    normal: Vector,
    stop: Point,
    wall_ends_with_line: bool,
    path: &mut Builder,
) {
    match cap {
        LineCap::Butt => {
            path.line_to(stop);
        }
        LineCap::Round => {
            let parallel = rotate_cw(normal);
            let projected_center = pivot + parallel;
            path.conic_to(projected_center + normal, projected_center, ROOT_2_OVER_2);
            path.conic_to(projected_center - normal, stop, ROOT_2_OVER_2);
        }
        LineCap::Square => {
            let parallel = rotate_cw(normal);
            if wall_ends_with_line {
                // The wall ended in a straight segment: slide its end out
                // instead of adding a seam.
                path.set_last_point(pivot + normal + parallel);
                path.line_to(pivot - normal + parallel);
            } else {
                path.line_to(pivot + normal + parallel);
                path.line_to(pivot - normal + parallel);
                path.line_to(stop);
            }
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
enum AngleType {
    Nearly180,
    Sharp,
    Shallow,
    NearlyLine,
}

fn dot_to_angle_type(dot: f32) -> AngleType {
    if dot >= 0.0 {
        if nearly_zero(1.0 - dot) {
            AngleType::NearlyLine
        } else {
            AngleType::Shallow
        }
    } else if nearly_zero(1.0 + dot) {
        AngleType::Nearly180
    } else {
        AngleType::Sharp
    }
}

fn is_clockwise(before: Vector, after: Vector) -> bool {
    before.x * after.y > before.y * after.x
}

// The stroke radius may be larger than the segments; connecting the inner
// walls directly could show through as a diagonal, so route through the
// pivot.
fn handle_inner_join(pivot: Point, after: Vector, inner: &mut Builder) {
    inner.line_to(pivot);
    inner.line_to(pivot - after);
}

fn emit_join(
    params: &StrokeParams,
    before_unit_normal: Vector,
    pivot: Point,
    after_unit_normal: Vector,
    radius: f32,
    prev_is_line: bool,
    curr_is_line: bool,
    walls: Walls,
) {
    let join = if params.join == LineJoin::Miter && params.miter_limit <= 1.0 {
        LineJoin::Bevel
    } else {
        params.join
    };
    match join {
        LineJoin::Bevel => bevel_join(before_unit_normal, pivot, after_unit_normal, radius, walls),
        LineJoin::Round => round_join(before_unit_normal, pivot, after_unit_normal, radius, walls),
        LineJoin::Miter => miter_join(
            before_unit_normal,
            pivot,
            after_unit_normal,
            radius,
            1.0 / params.miter_limit,
            prev_is_line,
            curr_is_line,
            walls,
        ),
    }
}

fn bevel_join(
    before_unit_normal: Vector,
    pivot: Point,
    after_unit_normal: Vector,
    radius: f32,
    mut walls: Walls,
) {
    let mut after = after_unit_normal * radius;
    if !is_clockwise(before_unit_normal, after_unit_normal) {
        walls.swap();
        after = -after;
    }
    walls.outer.line_to(pivot + after);
    handle_inner_join(pivot, after, walls.inner);
}

fn round_join(
    before_unit_normal: Vector,
    pivot: Point,
    after_unit_normal: Vector,
    radius: f32,
    mut walls: Walls,
) {
    let dot_prod = before_unit_normal.dot(after_unit_normal);
    if dot_to_angle_type(dot_prod) == AngleType::NearlyLine {
        return;
    }

    let mut before = before_unit_normal;
    let mut after = after_unit_normal;
    let mut dir = RotationDirection::Cw;
    if !is_clockwise(before, after) {
        walls.swap();
        before = -before;
        after = -after;
        dir = RotationDirection::Ccw;
    }

    let ts = Matrix::row_major(radius, 0.0, pivot.x, 0.0, radius, pivot.y, 0.0, 0.0, 1.0);
    let mut conics = ArrayVec::new();
    build_unit_arc(before, after, dir, &ts, &mut conics);
    if !conics.is_empty() {
        for conic in &conics {
            walls.outer.conic_to(conic.ctrl, conic.to, conic.w);
        }
        handle_inner_join(pivot, after * radius, walls.inner);
    }
}

fn miter_join(
    before_unit_normal: Vector,
    pivot: Point,
    after_unit_normal: Vector,
    radius: f32,
    inv_miter_limit: f32,
    prev_is_line: bool,
    mut curr_is_line: bool,
    mut walls: Walls,
) {
    fn do_blunt(walls: Walls, pivot: Point, radius: f32, curr_is_line: bool, after: Vector) {
        let after = after * radius;
        if !curr_is_line {
            walls.outer.line_to(pivot + after);
        }
        handle_inner_join(pivot, after, walls.inner);
    }

    fn do_miter(
        walls: Walls,
        pivot: Point,
        radius: f32,
        prev_is_line: bool,
        curr_is_line: bool,
        mid: Vector,
        after: Vector,
    ) {
        if prev_is_line {
            walls.outer.set_last_point(pivot + mid);
        } else {
            walls.outer.line_to(pivot + mid);
        }
        do_blunt(walls, pivot, radius, curr_is_line, after);
    }

    // The dot is between normals, not tangents, so its sign is opposite
    // the usual angle convention.
    let dot_prod = before_unit_normal.dot(after_unit_normal);
    let angle_type = dot_to_angle_type(dot_prod);
    let mut before = before_unit_normal;
    let mut after = after_unit_normal;

    if angle_type == AngleType::NearlyLine {
        return;
    }
    if angle_type == AngleType::Nearly180 {
        curr_is_line = false;
        do_blunt(walls, pivot, radius, curr_is_line, after);
        return;
    }

    let ccw = !is_clockwise(before, after);
    if ccw {
        walls.swap();
        before = -before;
        after = -after;
    }

    // An upright right angle (the common case when stroking rectangles)
    // avoids the square root entirely.
    if dot_prod == 0.0 && inv_miter_limit <= ROOT_2_OVER_2 {
        let mid = (before + after) * radius;
        do_miter(walls, pivot, radius, prev_is_line, curr_is_line, mid, after);
        return;
    }

    // mid_length = radius / sin(half angle); the miter overshoots when
    // 1 / sin(half) exceeds the limit. The dot is sign-flipped (normals),
    // hence 1 + dot instead of 1 - dot in the half-angle identity.
    let sin_half_angle = ((1.0 + dot_prod) * 0.5).sqrt();
    if sin_half_angle < inv_miter_limit {
        curr_is_line = false;
        do_blunt(walls, pivot, radius, curr_is_line, after);
        return;
    }

    // Choose the most accurate way to form the initial mid vector.
    let mut mid = if angle_type == AngleType::Sharp {
        let mut mid = Vector::new(after.y - before.y, before.x - after.x);
        if ccw {
            mid = -mid;
        }
        mid
    } else {
        Vector::new(before.x + after.x, before.y + after.y)
    };

    mid = set_length(mid, radius / sin_half_angle).unwrap_or(mid);
    do_miter(walls, pivot, radius, prev_is_line, curr_is_line, mid, after);
}

//------------------------------------------------------------------
// Geometry helpers

fn normal_pair(before: Point, after: Point, scale: f32, radius: f32) -> Option<(Vector, Vector)> {
    let unit = normalize(Vector::new(
        (after.x - before.x) * scale,
        (after.y - before.y) * scale,
    ))?;
    let unit_normal = rotate_ccw(unit);
    Some((unit_normal * radius, unit_normal))
}

fn vector_normal_pair(vec: Vector, radius: f32) -> Option<(Vector, Vector)> {
    let unit = normalize(vec)?;
    let unit_normal = rotate_ccw(unit);
    Some((unit_normal * radius, unit_normal))
}

fn degenerate_vector(v: Vector) -> bool {
    normalize(v).is_none()
}

fn points_within_dist(near_pt: Point, far_pt: Point, limit: f32) -> bool {
    (near_pt - far_pt).square_length() <= limit * limit
}

// The squared distance from the point to the segment.
fn pt_to_line(pt: Point, line_start: Point, line_end: Point) -> f32 {
    let dxy = line_end - line_start;
    let ab0 = pt - line_start;
    let numer = dxy.dot(ab0);
    let denom = dxy.dot(dxy);
    let t = numer / denom;
    if (0.0..=1.0).contains(&t) {
        let hit = line_start.lerp(line_end, t);
        (hit - pt).square_length()
    } else {
        (line_start - pt).square_length()
    }
}

fn sharp_angle(quad: &[Point; 3]) -> bool {
    let mut smaller = quad[1] - quad[0];
    let mut larger = quad[1] - quad[2];
    let smaller_len = smaller.square_length();
    let mut larger_len = larger.square_length();
    if smaller_len > larger_len {
        core::mem::swap(&mut smaller, &mut larger);
        larger_len = smaller_len;
    }
    match set_length(smaller, larger_len) {
        Some(scaled) => scaled.dot(larger) > 0.0,
        None => false,
    }
}

fn pt_in_quad_bounds(quad: &[Point; 3], pt: Point, inv_res_scale: f32) -> bool {
    let x_min = quad[0].x.min(quad[1].x).min(quad[2].x);
    if pt.x + inv_res_scale < x_min {
        return false;
    }
    let x_max = quad[0].x.max(quad[1].x).max(quad[2].x);
    if pt.x - inv_res_scale > x_max {
        return false;
    }
    let y_min = quad[0].y.min(quad[1].y).min(quad[2].y);
    if pt.y + inv_res_scale < y_min {
        return false;
    }
    let y_max = quad[0].y.max(quad[1].y).max(quad[2].y);
    if pt.y - inv_res_scale > y_max {
        return false;
    }
    true
}

// Intersects the ray with the quad, returning the t values on the quad
// where the ray's carrier line crosses it.
fn intersect_quad_ray(line: &[Point; 2], quad: &QuadraticBezierSegment) -> ArrayVec<f32, 2> {
    let vec = line[1] - line[0];
    let pts = [quad.from, quad.ctrl, quad.to];
    let mut r = [0.0f32; 3];
    for (dst, p) in r.iter_mut().zip(pts.iter()) {
        *dst = (p.y - line[0].y) * vec.x - (p.x - line[0].x) * vec.y;
    }
    let a = r[2] + r[0] - 2.0 * r[1];
    let b = r[1] - r[0];
    find_unit_quad_roots(a, 2.0 * b, r[0])
}

fn quad_tangent(quad: &QuadraticBezierSegment, t: f32, t_pt: &mut Point) -> Vector {
    *t_pt = quad.sample(t);
    let dxy = quad.derivative(t);
    if dxy == Vector::zero() {
        return quad.to - quad.from;
    }
    dxy
}

fn conic_tangent(conic: &ConicSegment, t: f32, t_pt: &mut Point) -> Vector {
    *t_pt = conic.sample(t);
    let dxy = conic.tangent(t);
    if dxy == Vector::zero() {
        return conic.to - conic.from;
    }
    dxy
}

fn cubic_tangent(cubic: &CubicBezierSegment, t: f32, t_pt: &mut Point) -> Vector {
    *t_pt = cubic.sample(t);
    let mut dxy = cubic.derivative(t);
    if dxy == Vector::zero() {
        if nearly_zero(t) {
            dxy = cubic.ctrl2 - cubic.from;
        } else if nearly_zero(1.0 - t) {
            dxy = cubic.to - cubic.ctrl1;
        } else {
            // The inflection may fall on a cusp; subdivide to recover a
            // tangent there.
            let (a, b) = cubic.split(t);
            dxy = b.ctrl1 - a.ctrl2;
            if dxy == Vector::zero() {
                dxy = b.ctrl1 - a.ctrl1;
            }
        }
        if dxy == Vector::zero() {
            dxy = cubic.to - cubic.from;
        }
    }
    dxy
}

// Scans the rest of the current contour for any segment that will produce
// a real tangent, so degenerate leading segments can be dropped.
fn has_valid_tangent(iter: &ContourIter) -> bool {
    let mut copy = iter.clone();
    while let Some(event) = copy.next_event() {
        match event {
            PathEvent::Move { .. } | PathEvent::Close { .. } => return false,
            PathEvent::Line { from, to } => {
                if from == to {
                    continue;
                }
                return true;
            }
            PathEvent::Quadratic { from, ctrl, to } => {
                if from == ctrl && from == to {
                    continue;
                }
                return true;
            }
            PathEvent::Conic { from, ctrl, to, .. } => {
                if from == ctrl && from == to {
                    continue;
                }
                return true;
            }
            PathEvent::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                if from == ctrl1 && from == ctrl2 && from == to {
                    continue;
                }
                return true;
            }
        }
    }
    false
}

//------------------------------------------------------------------
// Linearity reductions

fn check_quad_linear(quad: &QuadraticBezierSegment) -> (Point, ReductionType) {
    let degenerate_ab = degenerate_vector(quad.ctrl - quad.from);
    let degenerate_bc = degenerate_vector(quad.to - quad.ctrl);
    if degenerate_ab && degenerate_bc {
        return (Point::zero(), ReductionType::Point);
    }
    if degenerate_ab || degenerate_bc {
        return (Point::zero(), ReductionType::Line);
    }
    if !quad_in_line(&[quad.from, quad.ctrl, quad.to]) {
        return (Point::zero(), ReductionType::Quad);
    }
    let t = quad.max_curvature_t();
    if t == 0.0 || t == 1.0 {
        return (Point::zero(), ReductionType::Line);
    }
    (quad.sample(t), ReductionType::Degenerate)
}

fn check_conic_linear(conic: &ConicSegment) -> (Point, ReductionType) {
    let degenerate_ab = degenerate_vector(conic.ctrl - conic.from);
    let degenerate_bc = degenerate_vector(conic.to - conic.ctrl);
    if degenerate_ab && degenerate_bc {
        return (Point::zero(), ReductionType::Point);
    }
    if degenerate_ab || degenerate_bc {
        return (Point::zero(), ReductionType::Line);
    }
    if !quad_in_line(&[conic.from, conic.ctrl, conic.to]) {
        return (Point::zero(), ReductionType::Quad);
    }
    // A conic's max curvature would need its own solver; the quad's is a
    // reasonable substitute for a curve this close to its control polygon.
    let quad = QuadraticBezierSegment {
        from: conic.from,
        ctrl: conic.ctrl,
        to: conic.to,
    };
    let t = quad.max_curvature_t();
    if t == 0.0 || t == 1.0 {
        return (Point::zero(), ReductionType::Line);
    }
    (conic.sample(t), ReductionType::Degenerate)
}

fn check_cubic_linear(
    cubic: &CubicBezierSegment,
    reduction: &mut [Point; 3],
    tangent_pt: Option<&mut Point>,
) -> ReductionType {
    let degenerate_ab = degenerate_vector(cubic.ctrl1 - cubic.from);
    let degenerate_bc = degenerate_vector(cubic.ctrl2 - cubic.ctrl1);
    let degenerate_cd = degenerate_vector(cubic.to - cubic.ctrl2);
    if degenerate_ab && degenerate_bc && degenerate_cd {
        return ReductionType::Point;
    }
    if degenerate_ab as u32 + degenerate_bc as u32 + degenerate_cd as u32 == 2 {
        return ReductionType::Line;
    }
    if !cubic_in_line(cubic) {
        if let Some(tangent_pt) = tangent_pt {
            *tangent_pt = if degenerate_ab { cubic.ctrl2 } else { cubic.ctrl1 };
        }
        return ReductionType::Quad;
    }

    let mut r_count = 0;
    // Reject t values that evaluate to either end point.
    for t in cubic.max_curvature() {
        if t <= 0.0 || t >= 1.0 {
            continue;
        }
        let pos = cubic.sample(t);
        if pos != cubic.from && pos != cubic.to {
            reduction[r_count] = pos;
            r_count += 1;
        }
    }
    match r_count {
        0 => ReductionType::Line,
        1 => ReductionType::Degenerate,
        2 => ReductionType::Degenerate2,
        3 => ReductionType::Degenerate3,
        _ => unreachable!(),
    }
}

// Whether the inside point is close to a line connecting the outermost
// two, scaled by the polygon's own span so huge curves don't false-positive.
fn quad_in_line(quad: &[Point; 3]) -> bool {
    let mut pt_max = -1.0;
    let mut outer1 = 0;
    let mut outer2 = 0;
    for index in 0..2 {
        for inner in index + 1..3 {
            let test_diff = quad[inner] - quad[index];
            let test_max = test_diff.x.abs().max(test_diff.y.abs());
            if pt_max < test_max {
                outer1 = index;
                outer2 = inner;
                pt_max = test_max;
            }
        }
    }
    // The XOR of the three indices is 3, so the middle one falls out.
    let mid = outer1 ^ outer2 ^ 3;
    const CURVATURE_SLOP: f32 = 0.000005; // this multiplier is pulled out of the air
    let line_slop = pt_max * pt_max * CURVATURE_SLOP;
    pt_to_line(quad[mid], quad[outer1], quad[outer2]) <= line_slop
}

fn cubic_in_line(cubic: &CubicBezierSegment) -> bool {
    let pts = [cubic.from, cubic.ctrl1, cubic.ctrl2, cubic.to];
    let mut pt_max = -1.0;
    let mut outer1 = 0;
    let mut outer2 = 0;
    for index in 0..3 {
        for inner in index + 1..4 {
            let test_diff = pts[inner] - pts[index];
            let test_max = test_diff.x.abs().max(test_diff.y.abs());
            if pt_max < test_max {
                outer1 = index;
                outer2 = inner;
                pt_max = test_max;
            }
        }
    }
    // Pick the two interior indices out of the remaining pair.
    let mid1 = (1 + (2 >> outer2)) >> outer1;
    let mid2 = outer1 ^ outer2 ^ mid1;
    let line_slop = pt_max * pt_max * 0.00001; // this multiplier is pulled out of the air
    pt_to_line(pts[mid1], pts[outer1], pts[outer2]) <= line_slop
        && pt_to_line(pts[mid2], pts[outer1], pts[outer2]) <= line_slop
}

//------------------------------------------------------------------
// The quad stroke under construction

#[derive(Debug)]
struct QuadConstruct {
    quad: [Point; 3],     // the stroked quad parallel to the original curve
    tangent_start: Point, // a point tangent to quad[0]
    tangent_end: Point,   // a point tangent to quad[2]
    start_t: f32,         // a segment of the original curve
    mid_t: f32,
    end_t: f32,
    start_set: bool, // state shared across splits
    end_set: bool,
    opposite_tangents: bool, // set if coincident tangents have opposite directions
}

impl Default for QuadConstruct {
    fn default() -> Self {
        QuadConstruct {
            quad: [Point::zero(); 3],
            tangent_start: Point::zero(),
            tangent_end: Point::zero(),
            start_t: 0.0,
            mid_t: 0.0,
            end_t: 0.0,
            start_set: false,
            end_set: false,
            opposite_tangents: false,
        }
    }
}

impl QuadConstruct {
    // Returns false if start and end are too close to have a unique
    // middle.
    fn init(&mut self, start: f32, end: f32) -> bool {
        self.start_t = start;
        self.mid_t = ((start + end) * 0.5).clamp(0.0, 1.0);
        self.end_t = end;
        self.start_set = false;
        self.end_set = false;
        self.opposite_tangents = false;
        self.start_t < self.mid_t && self.mid_t < self.end_t
    }

    fn init_with_start(&mut self, parent: &Self) -> bool {
        if !self.init(parent.start_t, parent.mid_t) {
            return false;
        }
        self.quad[0] = parent.quad[0];
        self.tangent_start = parent.tangent_start;
        self.start_set = true;
        true
    }

    fn init_with_end(&mut self, parent: &Self) -> bool {
        if !self.init(parent.mid_t, parent.end_t) {
            return false;
        }
        self.quad[2] = parent.quad[2];
        self.tangent_end = parent.tangent_end;
        self.end_set = true;
        true
    }
}

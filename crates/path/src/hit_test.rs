//! Point-in-path testing.
//!
//! Casts a horizontal ray through the query point and accumulates signed
//! crossings. Curves are chopped at their y extrema first so each span is
//! monotonic and has at most one crossing, found by solving for `t`
//! directly (no flattening). Points that land *on* the path within
//! tolerance are tallied separately and resolved by comparing tangents, so
//! coincident edges do not double count.

use crate::math::{Point, Vector};
use crate::path::Path;
use crate::PathEvent;

use contour_geom::scalar::{find_unit_quad_roots, nearly_equal, nearly_zero, NEARLY_ZERO};
use contour_geom::{ConicSegment, CubicBezierSegment, QuadraticBezierSegment};

#[inline]
fn between(a: f32, b: f32, c: f32) -> bool {
    (a - b) * (c - b) <= 0.0
}

#[inline]
fn sign_as_int(x: f32) -> i32 {
    if x < 0.0 {
        -1
    } else if x > 0.0 {
        1
    } else {
        0
    }
}

// On a horizontal segment any x strictly before the end point counts as
// "on"; elsewhere only the exact start point does (end points are the next
// segment's start points).
fn check_on_curve(x: f32, y: f32, start: Point, end: Point) -> bool {
    if start.y == end.y {
        between(start.x, x, end.x) && x != end.x
    } else {
        x == start.x && y == start.y
    }
}

fn winding_line(from: Point, to: Point, x: f32, y: f32, on_curve_count: &mut i32) -> i32 {
    let mut y0 = from.y;
    let mut y1 = to.y;
    let dy = y1 - y0;

    let mut dir = 1;
    if y0 > y1 {
        core::mem::swap(&mut y0, &mut y1);
        dir = -1;
    }
    if y < y0 || y > y1 {
        return 0;
    }
    if check_on_curve(x, y, from, to) {
        *on_curve_count += 1;
        return 0;
    }
    if y == y1 {
        return 0;
    }

    let cross = (to.x - from.x) * (y - from.y) - dy * (x - from.x);
    if cross == 0.0 {
        // On the line (the endpoint case was handled above).
        if x != to.x || y != to.y {
            *on_curve_count += 1;
        }
        dir = 0;
    } else if sign_as_int(cross) == dir {
        dir = 0;
    }
    dir
}

fn winding_mono_quad(quad: &QuadraticBezierSegment, x: f32, y: f32, on_curve_count: &mut i32) -> i32 {
    let mut y0 = quad.from.y;
    let mut y2 = quad.to.y;

    let mut dir = 1;
    if y0 > y2 {
        core::mem::swap(&mut y0, &mut y2);
        dir = -1;
    }
    if y < y0 || y > y2 {
        return 0;
    }
    if check_on_curve(x, y, quad.from, quad.to) {
        *on_curve_count += 1;
        return 0;
    }
    if y == y2 {
        return 0;
    }

    let roots = find_unit_quad_roots(
        quad.from.y - 2.0 * quad.ctrl.y + quad.to.y,
        2.0 * (quad.ctrl.y - quad.from.y),
        quad.from.y - y,
    );
    let xt = match roots.first() {
        // No roots in (0, 1) only happens when the ray grazes an endpoint.
        None => {
            if dir == 1 {
                quad.from.x
            } else {
                quad.to.x
            }
        }
        Some(&t) => quad.x(t),
    };
    if nearly_equal(xt, x) {
        // Don't test end points; they're start points.
        if x != quad.to.x || y != quad.to.y {
            *on_curve_count += 1;
            return 0;
        }
    }
    if xt < x {
        dir
    } else {
        0
    }
}

fn winding_quad(quad: &QuadraticBezierSegment, x: f32, y: f32, on_curve_count: &mut i32) -> i32 {
    let (a, b) = quad.chop_at_y_extrema();
    let mut w = winding_mono_quad(&a, x, y, on_curve_count);
    if let Some(b) = b {
        w += winding_mono_quad(&b, x, y, on_curve_count);
    }
    w
}

fn conic_y_roots(conic: &ConicSegment, y: f32) -> Option<f32> {
    let a = conic.from.y;
    let b = conic.ctrl.y;
    let c = conic.to.y;
    let w = conic.w;
    // Solve N(t) - y·D(t) = 0 for the rational y coordinate.
    let qa = a + c - 2.0 * (b * w - y * w + y);
    let qb = b * w - w * y + y - a;
    let qc = a - y;
    find_unit_quad_roots(qa, 2.0 * qb, qc).first().copied()
}

fn winding_mono_conic(conic: &ConicSegment, x: f32, y: f32, on_curve_count: &mut i32) -> i32 {
    let mut y0 = conic.from.y;
    let mut y2 = conic.to.y;

    let mut dir = 1;
    if y0 > y2 {
        core::mem::swap(&mut y0, &mut y2);
        dir = -1;
    }
    if y < y0 || y > y2 {
        return 0;
    }
    if check_on_curve(x, y, conic.from, conic.to) {
        *on_curve_count += 1;
        return 0;
    }
    if y == y2 {
        return 0;
    }

    let xt = match conic_y_roots(conic, y) {
        None => {
            if dir == 1 {
                conic.from.x
            } else {
                conic.to.x
            }
        }
        Some(t) => conic.sample(t).x,
    };
    if nearly_equal(xt, x) {
        if x != conic.to.x || y != conic.to.y {
            *on_curve_count += 1;
            return 0;
        }
    }
    if xt < x {
        dir
    } else {
        0
    }
}

fn winding_conic(conic: &ConicSegment, x: f32, y: f32, on_curve_count: &mut i32) -> i32 {
    // Huge coordinates can defeat the projective chop even when the conic
    // is not monotonic; the original conic is then treated as one span.
    let chopped = if conic.is_y_monotonic() {
        None
    } else {
        conic.chop_at_y_extrema()
    };
    match chopped {
        None => winding_mono_conic(conic, x, y, on_curve_count),
        Some((a, b)) => {
            winding_mono_conic(&a, x, y, on_curve_count)
                + winding_mono_conic(&b, x, y, on_curve_count)
        }
    }
}

fn winding_mono_cubic(cubic: &CubicBezierSegment, x: f32, y: f32, on_curve_count: &mut i32) -> i32 {
    let mut y0 = cubic.from.y;
    let mut y3 = cubic.to.y;

    let mut dir = 1;
    if y0 > y3 {
        core::mem::swap(&mut y0, &mut y3);
        dir = -1;
    }
    if y < y0 || y > y3 {
        return 0;
    }
    if check_on_curve(x, y, cubic.from, cubic.to) {
        *on_curve_count += 1;
        return 0;
    }
    if y == y3 {
        return 0;
    }

    // Quick reject/accept against the control polygon's x span.
    let min = cubic.from.x.min(cubic.ctrl1.x).min(cubic.ctrl2.x).min(cubic.to.x);
    let max = cubic.from.x.max(cubic.ctrl1.x).max(cubic.ctrl2.x).max(cubic.to.x);
    if x < min {
        return 0;
    }
    if x > max {
        return dir;
    }

    let t = match cubic.solve_t_for_y_monotonic(y) {
        Some(t) => t,
        None => return 0,
    };
    let xt = cubic.x(t);
    if nearly_equal(xt, x) {
        if x != cubic.to.x || y != cubic.to.y {
            *on_curve_count += 1;
            return 0;
        }
    }
    if xt < x {
        dir
    } else {
        0
    }
}

fn winding_cubic(cubic: &CubicBezierSegment, x: f32, y: f32, on_curve_count: &mut i32) -> i32 {
    let mut w = 0;
    for mono in cubic.chop_at_y_extrema() {
        w += winding_mono_cubic(&mono, x, y, on_curve_count);
    }
    w
}

//------------------------------------------------------------------
// Tangent collection for on-curve resolution.

fn tangent_line(from: Point, to: Point, x: f32, y: f32, tangents: &mut Vec<Vector>) {
    if !between(from.y, y, to.y) {
        return;
    }
    if !between(from.x, x, to.x) {
        return;
    }
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if !nearly_equal((x - from.x) * dy, dx * (y - from.y)) {
        return;
    }
    tangents.push(Vector::new(dx, dy));
}

fn tangent_quad(quad: &QuadraticBezierSegment, x: f32, y: f32, tangents: &mut Vec<Vector>) {
    if !between(quad.from.y, y, quad.ctrl.y) && !between(quad.ctrl.y, y, quad.to.y) {
        return;
    }
    if !between(quad.from.x, x, quad.ctrl.x) && !between(quad.ctrl.x, x, quad.to.x) {
        return;
    }
    let roots = find_unit_quad_roots(
        quad.from.y - 2.0 * quad.ctrl.y + quad.to.y,
        2.0 * (quad.ctrl.y - quad.from.y),
        quad.from.y - y,
    );
    for &t in roots.iter() {
        if nearly_equal(quad.x(t), x) {
            tangents.push(quad.derivative(t));
        }
    }
}

fn tangent_conic(conic: &ConicSegment, x: f32, y: f32, tangents: &mut Vec<Vector>) {
    if !between(conic.from.y, y, conic.ctrl.y) && !between(conic.ctrl.y, y, conic.to.y) {
        return;
    }
    if !between(conic.from.x, x, conic.ctrl.x) && !between(conic.ctrl.x, x, conic.to.x) {
        return;
    }
    let a = conic.from.y;
    let b = conic.ctrl.y;
    let c = conic.to.y;
    let w = conic.w;
    let qa = a + c - 2.0 * (b * w - y * w + y);
    let qb = b * w - w * y + y - a;
    let qc = a - y;
    for &t in find_unit_quad_roots(qa, 2.0 * qb, qc).iter() {
        if nearly_equal(conic.sample(t).x, x) {
            tangents.push(conic.tangent(t));
        }
    }
}

fn tangent_cubic(cubic: &CubicBezierSegment, x: f32, y: f32, tangents: &mut Vec<Vector>) {
    if !between(cubic.from.y, y, cubic.ctrl1.y)
        && !between(cubic.ctrl1.y, y, cubic.ctrl2.y)
        && !between(cubic.ctrl2.y, y, cubic.to.y)
    {
        return;
    }
    if !between(cubic.from.x, x, cubic.ctrl1.x)
        && !between(cubic.ctrl1.x, x, cubic.ctrl2.x)
        && !between(cubic.ctrl2.x, x, cubic.to.x)
    {
        return;
    }
    for mono in cubic.chop_at_y_extrema() {
        if let Some(t) = mono.solve_t_for_y_monotonic(y) {
            if nearly_equal(mono.x(t), x) {
                tangents.push(mono.derivative(t));
            }
        }
    }
}

fn collect_tangents(path: &Path, x: f32, y: f32) -> Vec<Vector> {
    let mut tangents = Vec::new();
    for event in path.contour_iter(true) {
        let old_count = tangents.len();
        match event {
            PathEvent::Move { .. } | PathEvent::Close { .. } => {}
            PathEvent::Line { from, to } => tangent_line(from, to, x, y, &mut tangents),
            PathEvent::Quadratic { from, ctrl, to } => {
                tangent_quad(&QuadraticBezierSegment { from, ctrl, to }, x, y, &mut tangents)
            }
            PathEvent::Conic { from, ctrl, to, weight } => tangent_conic(
                &ConicSegment { from, ctrl, to, w: weight },
                x,
                y,
                &mut tangents,
            ),
            PathEvent::Cubic { from, ctrl1, ctrl2, to } => tangent_cubic(
                &CubicBezierSegment { from, ctrl1, ctrl2, to },
                x,
                y,
                &mut tangents,
            ),
        }
        if tangents.len() > old_count {
            let last = tangents.len() - 1;
            let tangent = tangents[last];
            if tangent.square_length() <= NEARLY_ZERO {
                tangents.remove(last);
            } else {
                // A pair of coincident opposite tangents is two edges
                // lying on top of each other; they cancel.
                for index in 0..last {
                    let test = tangents[index];
                    if nearly_zero(test.cross(tangent))
                        && sign_as_int(tangent.x * test.x) <= 0
                        && sign_as_int(tangent.y * test.y) <= 0
                    {
                        tangents.swap_remove(last);
                        tangents.swap_remove(index);
                        break;
                    }
                }
            }
        }
    }
    tangents
}

fn accumulate_winding(path: &Path, x: f32, y: f32, on_curve_count: &mut i32) -> i32 {
    let mut w = 0;
    for event in path.contour_iter(true) {
        match event {
            PathEvent::Move { .. } | PathEvent::Close { .. } => {}
            PathEvent::Line { from, to } => {
                w += winding_line(from, to, x, y, on_curve_count);
            }
            PathEvent::Quadratic { from, ctrl, to } => {
                w += winding_quad(&QuadraticBezierSegment { from, ctrl, to }, x, y, on_curve_count);
            }
            PathEvent::Conic { from, ctrl, to, weight } => {
                w += winding_conic(&ConicSegment { from, ctrl, to, w: weight }, x, y, on_curve_count);
            }
            PathEvent::Cubic { from, ctrl1, ctrl2, to } => {
                w += winding_cubic(
                    &CubicBezierSegment { from, ctrl1, ctrl2, to },
                    x,
                    y,
                    on_curve_count,
                );
            }
        }
    }
    w
}

pub(crate) fn contains(path: &Path, x: f32, y: f32) -> bool {
    let is_inverse = path.is_inverse_fill();
    if path.is_empty() {
        return is_inverse;
    }

    let bounds = path.bounds();
    let inside_bounds =
        bounds.min.x <= x && x <= bounds.max.x && bounds.min.y <= y && y <= bounds.max.y;
    if !inside_bounds {
        return is_inverse;
    }

    let mut on_curve_count = 0;
    let mut w = accumulate_winding(path, x, y, &mut on_curve_count);

    let even_odd = path.fill_rule().is_even_odd();
    if even_odd {
        w &= 1;
    }

    // Decide whether the point genuinely sits on the path. An even number
    // of touches under a winding fill may just be coincident opposite
    // edges lying on top of each other, which cancel; the remaining
    // tangents tell them apart.
    let on_boundary = if on_curve_count == 0 {
        false
    } else if on_curve_count <= 1 || (on_curve_count & 1) != 0 || even_odd {
        true
    } else {
        !collect_tangents(path, x, y).is_empty()
    };

    if !on_boundary {
        return (w != 0) ^ is_inverse;
    }

    // Boundary points resolve half-open: the point belongs to whichever
    // side lies just right of and below it, so left and top edges are in
    // while right and bottom edges are out.
    let nudge = (1.0 + x.abs().max(y.abs())) * NEARLY_ZERO;
    let mut ignored = 0;
    let mut w = accumulate_winding(path, x + nudge, y + nudge, &mut ignored);
    if even_odd {
        w &= 1;
    }
    (w != 0) ^ is_inverse
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{point, Box2D};
    use crate::{Direction, FillRule};

    fn rect_path(l: f32, t: f32, r: f32, b: f32) -> Path {
        let mut path = Path::new();
        path.add_rect(
            &Box2D {
                min: point(l, t),
                max: point(r, b),
            },
            Direction::Cw,
            0,
        );
        path
    }

    #[test]
    fn rect_containment_is_half_open() {
        let path = rect_path(0.0, 0.0, 10.0, 10.0);
        assert!(path.contains(5.0, 5.0));
        assert!(!path.contains(-1.0, -1.0));
        // Right edge excluded, left edge included.
        assert!(!path.contains(10.0, 5.0));
        assert!(path.contains(0.0, 0.0));
        assert!(path.contains(0.0, 5.0));
        // Same half-open rule vertically.
        assert!(path.contains(5.0, 0.0));
        assert!(!path.contains(5.0, 10.0));
    }

    #[test]
    fn inverse_fill_swaps_interior() {
        let mut path = rect_path(0.0, 0.0, 10.0, 10.0);
        path.set_fill_rule(FillRule::InverseWinding);
        assert!(!path.contains(5.0, 5.0));
        assert!(path.contains(20.0, 20.0));
    }

    #[test]
    fn even_odd_hole() {
        let mut path = rect_path(0.0, 0.0, 10.0, 10.0);
        path.add_rect(
            &Box2D {
                min: point(2.0, 2.0),
                max: point(8.0, 8.0),
            },
            Direction::Cw,
            0,
        );
        path.set_fill_rule(FillRule::EvenOdd);
        assert!(!path.contains(5.0, 5.0));
        assert!(path.contains(1.0, 5.0));

        // Winding fill keeps the middle filled.
        path.set_fill_rule(FillRule::Winding);
        assert!(path.contains(5.0, 5.0));
    }

    #[test]
    fn winding_hole_with_reversed_inner_rect() {
        let mut path = rect_path(0.0, 0.0, 10.0, 10.0);
        path.add_rect(
            &Box2D {
                min: point(2.0, 2.0),
                max: point(8.0, 8.0),
            },
            Direction::Ccw,
            0,
        );
        assert!(!path.contains(5.0, 5.0));
        assert!(path.contains(1.0, 5.0));
    }

    #[test]
    fn curves_contain_their_belly() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.quadratic_bezier_to(point(50.0, 100.0), point(100.0, 0.0));
        path.close();
        assert!(path.contains(50.0, 20.0));
        assert!(!path.contains(50.0, 60.0));
        assert!(!path.contains(5.0, 40.0));

        let mut circle = Path::new();
        circle.add_circle(50.0, 50.0, 10.0, Direction::Cw);
        assert!(circle.contains(50.0, 50.0));
        assert!(circle.contains(43.0, 50.0));
        assert!(!circle.contains(42.0, 42.0));
        assert!(!circle.contains(61.0, 50.0));
    }

    #[test]
    fn cubic_s_curve_winding() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.cubic_bezier_to(point(75.0, 300.0), point(225.0, -300.0), point(300.0, 0.0));
        path.close();
        // Inside the first (upper in y) hump.
        assert!(path.contains(75.0, 50.0));
        // Inside the second hump, which winds the other way around y=0.
        assert!(path.contains(225.0, -50.0));
        assert!(!path.contains(75.0, -50.0));
    }

    #[test]
    fn open_contours_are_force_closed() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(10.0, 0.0));
        path.line_to(point(10.0, 10.0));
        // Treated as the closed triangle (0,0) (10,0) (10,10).
        assert!(path.contains(8.0, 4.0));
        assert!(!path.contains(2.0, 8.0));
    }

    #[test]
    fn nan_paths_contain_nothing() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(f32::NAN, 10.0));
        path.line_to(point(10.0, 10.0));
        path.close();
        assert!(!path.contains(1.0, 1.0));
    }
}

//! Convexity and first-direction analysis.
//!
//! Convexity is decided by a two-stage test: a cheap sign-change count over
//! the raw point array rejects most concave paths, and a full replay
//! through a small state machine (the convexicator) settles the rest by
//! watching the turn direction of every non-zero edge vector.

use crate::math::{Point, Vector};
use crate::path::Path;
use crate::{Convexity, Direction, PathEvent, Verb};

#[derive(Copy, Clone, PartialEq, Eq)]
enum DirChange {
    Invalid,
    Left,
    Right,
    Straight,
    // A 180° turn; simple back-and-forth lines stay convex.
    Backwards,
    Unknown,
}

struct Convexicator {
    first_pt: Point,
    first_vec: Vector,
    last_pt: Point,
    last_vec: Vector,
    expected_dir: DirChange,
    first_direction: Option<Direction>,
    reversals: u32,
    is_finite: bool,
}

impl Convexicator {
    fn new() -> Self {
        Convexicator {
            first_pt: Point::zero(),
            first_vec: Vector::zero(),
            last_pt: Point::zero(),
            last_vec: Vector::zero(),
            expected_dir: DirChange::Invalid,
            first_direction: None,
            reversals: 0,
            is_finite: true,
        }
    }

    /// Only meaningful when the path came out convex.
    fn first_direction(&self) -> Option<Direction> {
        self.first_direction
    }

    fn set_move_pt(&mut self, pt: Point) {
        self.first_pt = pt;
        self.last_pt = pt;
        self.expected_dir = DirChange::Invalid;
    }

    fn add_pt(&mut self, pt: Point) -> bool {
        if self.last_pt == pt {
            return true;
        }
        // Only true for the first non-zero vector after set_move_pt.
        if self.first_pt == self.last_pt && self.expected_dir == DirChange::Invalid {
            self.last_vec = pt - self.last_pt;
            self.first_vec = self.last_vec;
        } else if !self.add_vec(pt - self.last_pt) {
            return false;
        }
        self.last_pt = pt;
        true
    }

    /// The wrap-around check: virtually extend the last vector by the
    /// first so the turn across the contour's seam is validated too.
    fn close(&mut self) -> bool {
        let first_pt = self.first_pt;
        let first_vec = self.first_vec;
        self.add_pt(first_pt) && self.add_vec(first_vec)
    }

    fn direction_change(&self, cur_vec: Vector) -> DirChange {
        let cross = self.last_vec.cross(cur_vec);
        if !cross.is_finite() {
            return DirChange::Unknown;
        }
        if cross == 0.0 {
            return if self.last_vec.dot(cur_vec) < 0.0 {
                DirChange::Backwards
            } else {
                DirChange::Straight
            };
        }
        if cross > 0.0 {
            DirChange::Right
        } else {
            DirChange::Left
        }
    }

    fn add_vec(&mut self, cur_vec: Vector) -> bool {
        match self.direction_change(cur_vec) {
            dir @ (DirChange::Left | DirChange::Right) => {
                if self.expected_dir == DirChange::Invalid {
                    self.expected_dir = dir;
                    self.first_direction = Some(if dir == DirChange::Right {
                        Direction::Cw
                    } else {
                        Direction::Ccw
                    });
                } else if dir != self.expected_dir {
                    self.first_direction = None;
                    return false;
                }
                self.last_vec = cur_vec;
                true
            }
            DirChange::Straight => true,
            DirChange::Backwards => {
                // A straight contour doubles back twice when replayed with
                // its virtual closing edge; a third reversal means real
                // concavity.
                self.last_vec = cur_vec;
                self.reversals += 1;
                self.reversals < 3
            }
            DirChange::Unknown => {
                self.is_finite = false;
                false
            }
            DirChange::Invalid => unreachable!(),
        }
    }
}

// Counts sign changes of dx and dy along the point array, wrapping around
// to the first point. More than three changes on either axis cannot be
// convex, whatever the verbs say.
fn by_sign(points: &[Point]) -> Convexity {
    if points.len() <= 3 {
        // Point, line or triangle is always convex.
        return Convexity::Convex;
    }

    let sign = |x: f32| -> i32 { (x < 0.0) as i32 };
    const NEVER_RETURNED: i32 = 2;

    let first = points[0];
    let mut curr = first;
    let mut dxes = 0;
    let mut dyes = 0;
    let mut last_sx = NEVER_RETURNED;
    let mut last_sy = NEVER_RETURNED;

    for pt in points[1..].iter().chain(core::iter::once(&first)) {
        let vec = *pt - curr;
        if vec != Vector::zero() {
            if !vec.x.is_finite() || !vec.y.is_finite() {
                return Convexity::Unknown;
            }
            let sx = sign(vec.x);
            let sy = sign(vec.y);
            dxes += (sx != last_sx) as i32;
            dyes += (sy != last_sy) as i32;
            if dxes > 3 || dyes > 3 {
                return Convexity::Concave;
            }
            last_sx = sx;
            last_sy = sy;
        }
        curr = *pt;
    }

    // May be convex; the full pass decides.
    Convexity::Convex
}

pub(crate) fn compute_convexity(path: &Path) -> Convexity {
    let fail = || {
        path.set_convexity(Convexity::Concave);
        Convexity::Concave
    };
    let succeed = |convexity: Convexity| {
        path.set_convexity(convexity);
        convexity
    };

    if !path.is_finite() {
        return fail();
    }

    // The point array may carry leading and trailing move blocks that do
    // not affect convexity; anything else before the last move means more
    // than one real contour.
    let mut point_count = path.count_points();
    let leading_moves = path
        .verbs()
        .iter()
        .take_while(|v| **v == Verb::Move)
        .count();
    let skip = leading_moves.saturating_sub(1);

    if path.last_move_index >= 0 {
        let last_move = path.last_move_index as usize;
        if last_move + 1 == point_count {
            let mut i = path.count_verbs();
            while i > 1 && path.verbs()[i - 1] == Verb::Move {
                i -= 1;
                point_count -= 1;
            }
        } else if last_move != skip {
            // An extra move between two verb runs: multiple contours.
            return succeed(Convexity::Concave);
        }
    }

    let points = &path.points()[skip.min(point_count)..point_count];
    if by_sign(points) != Convexity::Convex {
        return succeed(Convexity::Concave);
    }

    let mut contour_count = 0;
    let mut needs_close = false;
    let mut state = Convexicator::new();

    for event in path.iter() {
        if contour_count == 0 {
            if let PathEvent::Move { at } = event {
                state.set_move_pt(at);
                continue;
            }
            // The actual contour starts with this verb.
            contour_count = 1;
            needs_close = true;
        }
        if contour_count == 1 {
            match event {
                PathEvent::Move { .. } | PathEvent::Close { .. } => {
                    if !state.close() {
                        return fail();
                    }
                    needs_close = false;
                    contour_count = 2;
                }
                PathEvent::Line { to, .. } => {
                    if !state.add_pt(to) {
                        return fail();
                    }
                }
                PathEvent::Quadratic { ctrl, to, .. } | PathEvent::Conic { ctrl, to, .. } => {
                    if !state.add_pt(ctrl) || !state.add_pt(to) {
                        return fail();
                    }
                }
                PathEvent::Cubic {
                    ctrl1, ctrl2, to, ..
                } => {
                    if !state.add_pt(ctrl1) || !state.add_pt(ctrl2) || !state.add_pt(to) {
                        return fail();
                    }
                }
            }
        } else if !matches!(event, PathEvent::Move { .. }) {
            // A second contour with real geometry cannot be convex.
            return fail();
        }
    }

    if needs_close && !state.close() {
        return fail();
    }

    if path.first_direction_or_unknown().is_none() {
        if state.first_direction().is_none() && !path.bounds().is_empty() {
            return succeed(if state.reversals < 3 {
                Convexity::Convex
            } else {
                Convexity::Concave
            });
        }
        path.set_first_direction(state.first_direction());
    }
    succeed(Convexity::Convex)
}

//------------------------------------------------------------------
// First direction

// Runs of points, one per contour (the move point plus every point the
// contour's verbs consume).
fn contour_point_runs(path: &Path) -> Vec<&[Point]> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for verb in path.verbs() {
        if *verb == Verb::Move {
            if count > 0 {
                runs.push(&path.points()[start..start + count]);
                start += count;
            }
            count = 1;
        } else {
            count += verb.point_advance();
        }
    }
    if count > 0 {
        runs.push(&path.points()[start..start + count]);
    }
    runs
}

// Cross product of (p1 - p0) and (p2 - p0), promoted to doubles when the
// f32 subtraction underflows to zero.
fn cross_prod(p0: Point, p1: Point, p2: Point) -> f32 {
    let cross = (p1 - p0).cross(p2 - p0);
    if cross == 0.0 {
        let (p0x, p0y) = (p0.x as f64, p0.y as f64);
        let (p1x, p1y) = (p1.x as f64, p1.y as f64);
        let (p2x, p2y) = (p2.x as f64, p2.y as f64);
        return ((p1x - p0x) * (p2y - p0y) - (p1y - p0y) * (p2x - p0x)) as f32;
    }
    cross
}

// First index holding the maximum y.
fn find_max_y(pts: &[Point]) -> usize {
    let mut max = pts[0].y;
    let mut first_index = 0;
    for (i, pt) in pts.iter().enumerate().skip(1) {
        if pt.y > max {
            max = pt.y;
            first_index = i;
        }
    }
    first_index
}

// Walks from `index` by `inc` (mod n) to the next point that differs.
fn find_diff_pt(pts: &[Point], index: usize, inc: usize) -> usize {
    let n = pts.len();
    let mut i = index;
    loop {
        i = (i + inc) % n;
        if i == index {
            break;
        }
        if pts[index] != pts[i] {
            break;
        }
    }
    i
}

// x-min and x-max indices of the run of equal-y points starting at
// `index`.
fn find_min_max_x_at_y(pts: &[Point], index: usize) -> (usize, usize) {
    let y = pts[index].y;
    let mut min = pts[index].x;
    let mut max = min;
    let mut min_index = index;
    let mut max_index = index;
    for (i, pt) in pts.iter().enumerate().skip(index + 1) {
        if pt.y != y {
            break;
        }
        if pt.x < min {
            min = pt.x;
            min_index = i;
        } else if pt.x > max {
            max = pt.x;
            max_index = i;
        }
    }
    (min_index, max_index)
}

/// Direction of the contour holding the global y-max. Looking only at the
/// first contour could pick a hole wound the other way, so all contours
/// compete and the outermost (highest) one wins.
pub(crate) fn compute_first_direction(path: &Path) -> Option<Direction> {
    if let Some(d) = path.first_direction_or_unknown() {
        return Some(d);
    }

    // Don't pay for a convexity computation here; but when convexity is
    // already known convex the convexicator had its chance to set the
    // direction, and silence means there is none to find.
    if path.convexity_or_unknown() == Convexity::Convex {
        return None;
    }

    let mut ymax = path.bounds().min.y;
    let mut ymax_cross = 0.0f32;

    for pts in contour_point_runs(path) {
        let n = pts.len();
        if n < 3 {
            continue;
        }

        let index = find_max_y(pts);
        if pts[index].y < ymax {
            continue;
        }

        let mut cross = 0.0f32;
        if pts[(index + 1) % n].y == pts[index].y {
            // A horizontal run at the top: the x-order of its extremes
            // tells the winding without any cross product.
            let (min_index, max_index) = find_min_max_x_at_y(pts, index);
            if min_index != max_index {
                cross = min_index as f32 - max_index as f32;
            }
        }
        if cross == 0.0 {
            // Walk in both directions to points that actually differ; the
            // contour may be locally degenerate.
            let prev = find_diff_pt(pts, index, n - 1);
            if prev == index {
                continue;
            }
            let next = find_diff_pt(pts, index, 1);
            cross = cross_prod(pts[prev], pts[index], pts[next]);
            if cross == 0.0 && pts[prev].y == pts[index].y && pts[next].y == pts[index].y {
                cross = pts[index].x - pts[next].x;
            }
        }

        if cross != 0.0 {
            ymax = pts[index].y;
            ymax_cross = cross;
        }
    }

    if ymax_cross != 0.0 {
        let d = if ymax_cross > 0.0 {
            Direction::Cw
        } else {
            Direction::Ccw
        };
        path.set_first_direction(Some(d));
        Some(d)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{point, Box2D};

    #[test]
    fn rects_are_convex_both_ways() {
        for dir in [Direction::Cw, Direction::Ccw] {
            let mut path = Path::new();
            path.add_rect(
                &Box2D {
                    min: point(0.0, 0.0),
                    max: point(10.0, 10.0),
                },
                dir,
                0,
            );
            assert!(path.is_convex());
            assert_eq!(path.first_direction(), Some(dir));
        }
    }

    #[test]
    fn concave_l_shape() {
        let mut path = Path::new();
        path.add_polygon(
            &[
                point(0.0, 0.0),
                point(10.0, 0.0),
                point(10.0, 5.0),
                point(5.0, 5.0),
                point(5.0, 10.0),
                point(0.0, 10.0),
            ],
            true,
        );
        assert!(!path.is_convex());
        assert_eq!(path.convexity(), Convexity::Concave);
    }

    #[test]
    fn back_and_forth_line_is_convex() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(10.0, 10.0));
        path.line_to(point(0.0, 0.0));
        assert!(path.is_convex());
        // Straight segments only: no direction to report.
        assert_eq!(path.first_direction(), None);
    }

    #[test]
    fn two_real_contours_are_concave() {
        let mut path = Path::new();
        path.add_rect(
            &Box2D {
                min: point(0.0, 0.0),
                max: point(4.0, 4.0),
            },
            Direction::Cw,
            0,
        );
        path.add_rect(
            &Box2D {
                min: point(10.0, 10.0),
                max: point(14.0, 14.0),
            },
            Direction::Cw,
            0,
        );
        assert!(!path.is_convex());
    }

    #[test]
    fn direction_of_concave_polygon() {
        // A concave arrow head wound counter-clockwise in y-down coords.
        let mut path = Path::new();
        path.add_polygon(
            &[
                point(0.0, 0.0),
                point(4.0, 10.0),
                point(8.0, 0.0),
                point(4.0, 4.0),
            ],
            true,
        );
        assert!(!path.is_convex());
        assert_eq!(path.first_direction(), Some(Direction::Ccw));
    }

    #[test]
    fn triangle_direction_comes_from_convexicator() {
        let mut path = Path::new();
        path.add_polygon(&[point(0.0, 0.0), point(10.0, 0.0), point(5.0, 8.0)], true);
        assert!(path.is_convex());
        assert_eq!(path.first_direction(), Some(Direction::Cw));
    }

    #[test]
    fn non_finite_paths_are_concave() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(f32::INFINITY, 0.0));
        path.line_to(point(1.0, 1.0));
        assert_eq!(path.convexity(), Convexity::Concave);
    }
}

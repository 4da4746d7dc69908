//! Recognizing special shapes in a verb stream.

use crate::math::{Point, Vector};
use crate::path::Path;
use crate::{Direction, PathEvent, Verb};

use contour_geom::{Box2D, ConicSegment, RoundedRect};

// Direction codes for rectangle sides: bit 0 set for horizontal travel,
// bit 1 set for rightward or downward travel. Opposite sides xor to 2,
// perpendicular sides to 1 or 3.
fn rect_make_dir(dx: f32, dy: f32) -> i32 {
    ((dx != 0.0) as i32) | ((((dx > 0.0) || (dy > 0.0)) as i32) << 1)
}

/// Walks one contour deciding whether it is a closed axis-aligned
/// rectangle: four direction codes, alternating axes, opposite sides
/// opposed, collinear continuations and repeated points allowed, curves
/// and diagonals not.
///
/// With `allow_partial` the walk stops at the first complete rectangle and
/// leaves the cursors on the next contour, so a caller can pull the second
/// rect of a hollow fill out of the same stream.
pub(crate) fn rect_contour(
    verbs: &[Verb],
    points: &[Point],
    allow_partial: bool,
    curr_verb: &mut usize,
    pt_idx: &mut usize,
) -> Option<(Box2D, bool, Direction)> {
    let mut corners = 0usize;
    let mut line_start = Point::zero();
    let mut first_pt: Option<usize> = None;
    let mut last_pt: Option<usize> = None;
    let mut first_corner = Point::zero();
    let mut third_corner = Point::zero();
    let mut save_pts: Option<usize> = None;
    let mut directions = [-1i32; 5];
    let mut closed_or_moved = false;
    let mut auto_close = false;
    let mut insert_close = false;

    while *curr_verb < verbs.len() && (!allow_partial || !auto_close) {
        let synthetic = insert_close;
        let verb = if insert_close { Verb::Close } else { verbs[*curr_verb] };
        match verb {
            Verb::Close | Verb::Line => {
                if verb == Verb::Close {
                    save_pts = Some(*pt_idx);
                    auto_close = true;
                    insert_close = false;
                } else {
                    last_pt = Some(*pt_idx);
                }
                let line_end = if verb == Verb::Close {
                    points[first_pt?]
                } else {
                    let p = points[*pt_idx];
                    *pt_idx += 1;
                    p
                };
                let delta: Vector = line_end - line_start;
                if delta.x != 0.0 && delta.y != 0.0 {
                    return None; // diagonal
                }
                if !delta.x.is_finite() || !delta.y.is_finite() {
                    return None;
                }
                if line_start != line_end {
                    let next_dir = rect_make_dir(delta.x, delta.y);
                    if corners == 0 {
                        directions[0] = next_dir;
                        corners = 1;
                        closed_or_moved = false;
                        line_start = line_end;
                    } else if closed_or_moved {
                        return None; // closed followed by a line
                    } else if auto_close && next_dir == directions[0] {
                        // Colinear with the first side.
                    } else {
                        closed_or_moved = auto_close;
                        if directions[corners - 1] == next_dir {
                            // Colinear continuation of the current side.
                            if corners == 3 && verb == Verb::Line {
                                third_corner = line_end;
                            }
                            line_start = line_end;
                        } else {
                            directions[corners] = next_dir;
                            corners += 1;
                            match corners {
                                2 => first_corner = line_start,
                                3 => {
                                    if (directions[0] ^ directions[2]) != 2 {
                                        return None;
                                    }
                                    third_corner = line_end;
                                }
                                4 => {
                                    if (directions[1] ^ directions[3]) != 2 {
                                        return None;
                                    }
                                }
                                _ => return None, // too many turns
                            }
                            line_start = line_end;
                        }
                    }
                }
            }
            Verb::Quad | Verb::Conic | Verb::Cubic => return None,
            Verb::Move => {
                if allow_partial && !auto_close && directions[0] >= 0 {
                    // The contour ended without a close; synthesize one and
                    // revisit this move afterwards.
                    insert_close = true;
                    continue;
                }
                if corners == 0 {
                    first_pt = Some(*pt_idx);
                } else {
                    let close_xy: Vector = points[first_pt?] - points[last_pt?];
                    if close_xy.x != 0.0 && close_xy.y != 0.0 {
                        return None;
                    }
                }
                line_start = points[*pt_idx];
                *pt_idx += 1;
                closed_or_moved = true;
            }
        }
        if !synthetic {
            *curr_verb += 1;
        }
    }

    if !(3..=4).contains(&corners) {
        return None;
    }
    if let Some(save) = save_pts {
        *pt_idx = save;
    }
    let close_xy: Vector = points[first_pt?] - points[last_pt?];
    if close_xy.x != 0.0 && close_xy.y != 0.0 {
        return None;
    }

    let rect = Box2D {
        min: first_corner.min(third_corner),
        max: first_corner.max(third_corner),
    };
    let direction = if directions[0] == ((directions[1] + 1) & 3) {
        Direction::Cw
    } else {
        Direction::Ccw
    };
    Some((rect, auto_close, direction))
}

pub(crate) fn is_rect(path: &Path) -> Option<(Box2D, bool, Direction)> {
    let mut curr_verb = 0;
    let mut pt_idx = 0;
    rect_contour(path.verbs(), path.points(), false, &mut curr_verb, &mut pt_idx)
}

/// Conservative (quick) test that all segments are axis-aligned, looking
/// only at consecutive raw points. Multiple contours can produce a false
/// negative, which is acceptable for a convexity-preservation check.
pub(crate) fn is_axis_aligned(path: &Path) -> bool {
    let pts = path.points();
    for i in 1..pts.len() {
        if pts[i - 1].x != pts[i].x && pts[i - 1].y != pts[i].y {
            return false;
        }
    }
    true
}

/// Rebuilds the rounded rect a hinted path was appended from. Only valid
/// when the round-rect hint is set: the verb stream is then known to be
/// the canonical alternation of axis-aligned lines and quarter-arc
/// conics.
pub(crate) fn reconstruct_rrect(path: &Path) -> RoundedRect {
    let bounds = path.bounds();
    let mut radii = [Vector::zero(); 4];

    for event in path.iter() {
        if let PathEvent::Conic { from, ctrl, to, .. } = event {
            let v1_0: Vector = ctrl - from;
            let v2_1: Vector = to - ctrl;
            let dxdy = if v1_0.x != 0.0 {
                Vector::new(v1_0.x.abs(), v2_1.y.abs())
            } else if v1_0.y == 0.0 {
                Vector::new(v2_1.x.abs(), v2_1.y.abs())
            } else {
                Vector::new(v2_1.x.abs(), v1_0.y.abs())
            };
            let corner = if ctrl.x == bounds.min.x {
                if ctrl.y == bounds.min.y {
                    0 // upper left
                } else {
                    3 // lower left
                }
            } else if ctrl.y == bounds.min.y {
                1 // upper right
            } else {
                2 // lower right
            };
            radii[corner] = dxdy;
        }
    }
    RoundedRect::new(bounds, radii)
}

fn check_edge_against_rect(p0: Point, p1: Point, rect: &Box2D, dir: Direction) -> bool {
    let (edge_begin, v): (Point, Vector) = if dir == Direction::Cw {
        (p0, p1 - p0)
    } else {
        (p1, p0 - p1)
    };
    if v.x != 0.0 || v.y != 0.0 {
        // Cross products of v with the vectors to each rect corner must
        // all land on the interior side.
        let y_l = v.y * (rect.min.x - edge_begin.x);
        let x_t = v.x * (rect.min.y - edge_begin.y);
        let y_r = v.y * (rect.max.x - edge_begin.x);
        let x_b = v.x * (rect.max.y - edge_begin.y);
        if x_t < y_l || x_t < y_r || x_b < y_l || x_b < y_r {
            return false;
        }
    }
    true
}

/// Whether the whole of `rect` is provably inside the filled path. Only
/// answers for convex paths with a known direction; `false` otherwise.
pub(crate) fn conservatively_contains_rect(path: &Path, rect: &Box2D) -> bool {
    if !path.is_convex() {
        return false;
    }
    let direction = match crate::convexity::compute_first_direction(path) {
        Some(d) => d,
        None => return false,
    };

    let mut first_pt = Point::zero();
    let mut prev_pt = Point::zero();
    let mut segment_count = 0;

    for event in path.iter() {
        match event {
            PathEvent::Close { .. } => {
                segment_count += 1;
                break;
            }
            PathEvent::Move { at } => {
                if segment_count > 0 {
                    segment_count += 1;
                    break;
                }
                first_pt = at;
                prev_pt = at;
            }
            PathEvent::Conic {
                from,
                ctrl,
                to,
                weight,
            } => {
                if from == ctrl && ctrl == to {
                    continue;
                }
                segment_count += 1;
                // Test against the hull of the two-quad approximation so
                // the bulge of the conic is accounted for.
                let conic = ConicSegment {
                    from,
                    ctrl,
                    to,
                    w: weight,
                };
                let (a, b) = conic.split_in_half();
                if !check_edge_against_rect(a.from, a.to, rect, direction) {
                    return false;
                }
                if !check_edge_against_rect(b.from, b.to, rect, direction) {
                    return false;
                }
                prev_pt = to;
            }
            PathEvent::Line { from, to } => {
                if from == to {
                    continue;
                }
                segment_count += 1;
                if !check_edge_against_rect(prev_pt, to, rect, direction) {
                    return false;
                }
                prev_pt = to;
            }
            PathEvent::Quadratic { from, ctrl, to } => {
                if from == ctrl && ctrl == to {
                    continue;
                }
                segment_count += 1;
                if !check_edge_against_rect(prev_pt, to, rect, direction) {
                    return false;
                }
                prev_pt = to;
            }
            PathEvent::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                if from == ctrl1 && ctrl1 == ctrl2 && ctrl2 == to {
                    continue;
                }
                segment_count += 1;
                if !check_edge_against_rect(prev_pt, to, rect, direction) {
                    return false;
                }
                prev_pt = to;
            }
        }
    }

    if segment_count > 0 {
        check_edge_against_rect(prev_pt, first_pt, rect, direction)
    } else {
        false
    }
}

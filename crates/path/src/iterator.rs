//! Read-only cursors over a path.
//!
//! [`Iter`] yields the verbs exactly as stored. [`ContourIter`] normalizes
//! contour ends: an explicit close is preceded by the implicit closing line
//! when the contour did not return to its starting point, and with
//! `force_close` every contour is closed whether or not a close verb was
//! recorded.
//!
//! Both cursors resolve each verb's starting point, so consumers receive
//! complete curves without tracking any state of their own.

use crate::math::Point;
use crate::path::Path;
use crate::{PathEvent, Verb};

/// Iterates over a path's verbs as stored.
pub struct Iter<'l> {
    verbs: &'l [Verb],
    points: &'l [Point],
    weights: &'l [f32],
    verb_index: usize,
    point_index: usize,
    weight_index: usize,
    last_pt: Point,
    move_pt: Point,
}

impl<'l> Iter<'l> {
    pub(crate) fn new(path: &'l Path) -> Self {
        // Don't allow iteration through non-finite points.
        let verbs: &[Verb] = if path.is_finite() { path.verbs() } else { &[] };
        Iter {
            verbs,
            points: path.points(),
            weights: path.conic_weights(),
            verb_index: 0,
            point_index: 0,
            weight_index: 0,
            last_pt: Point::zero(),
            move_pt: Point::zero(),
        }
    }
}

impl<'l> Iterator for Iter<'l> {
    type Item = PathEvent;

    fn next(&mut self) -> Option<PathEvent> {
        let verb = *self.verbs.get(self.verb_index)?;
        self.verb_index += 1;

        let pts = &self.points[self.point_index..];
        self.point_index += verb.point_advance();

        Some(match verb {
            Verb::Move => {
                self.move_pt = pts[0];
                self.last_pt = pts[0];
                PathEvent::Move { at: pts[0] }
            }
            Verb::Line => {
                let from = self.last_pt;
                self.last_pt = pts[0];
                PathEvent::Line { from, to: pts[0] }
            }
            Verb::Quad => {
                let from = self.last_pt;
                self.last_pt = pts[1];
                PathEvent::Quadratic {
                    from,
                    ctrl: pts[0],
                    to: pts[1],
                }
            }
            Verb::Conic => {
                let from = self.last_pt;
                self.last_pt = pts[1];
                let weight = self.weights[self.weight_index];
                self.weight_index += 1;
                PathEvent::Conic {
                    from,
                    ctrl: pts[0],
                    to: pts[1],
                    weight,
                }
            }
            Verb::Cubic => {
                let from = self.last_pt;
                self.last_pt = pts[2];
                PathEvent::Cubic {
                    from,
                    ctrl1: pts[0],
                    ctrl2: pts[1],
                    to: pts[2],
                }
            }
            Verb::Close => {
                let last = self.last_pt;
                self.last_pt = self.move_pt;
                PathEvent::Close {
                    last,
                    first: self.move_pt,
                }
            }
        })
    }
}

/// Iterates over a path contour by contour, synthesizing the implicit
/// closing line.
///
/// After an event was returned, [`is_close_line`](Self::is_close_line)
/// tells whether it was the synthetic line and
/// [`is_closed_contour`](Self::is_closed_contour) whether the current
/// contour ends in a close.
#[derive(Clone)]
pub struct ContourIter<'l> {
    verbs: &'l [Verb],
    points: &'l [Point],
    weights: &'l [f32],
    verb_index: usize,
    point_index: usize,
    weight_index: usize,
    move_pt: Point,
    last_pt: Point,
    force_close: bool,
    need_close: bool,
    close_line: bool,
}

// NaN coordinates make == useless for "did we return to the start";
// treat any NaN as "already there" so the iterator terminates.
fn same_point(a: Point, b: Point) -> bool {
    if a.x.is_nan() || a.y.is_nan() || b.x.is_nan() || b.y.is_nan() {
        return true;
    }
    a == b
}

impl<'l> ContourIter<'l> {
    pub(crate) fn new(path: &'l Path, force_close: bool) -> Self {
        let verbs: &[Verb] = if path.is_finite() { path.verbs() } else { &[] };
        ContourIter {
            verbs,
            points: path.points(),
            weights: path.conic_weights(),
            verb_index: 0,
            point_index: 0,
            weight_index: 0,
            move_pt: Point::zero(),
            last_pt: Point::zero(),
            force_close,
            need_close: false,
            close_line: false,
        }
    }

    /// Whether the last returned line event was the synthesized closing
    /// line.
    #[inline]
    pub fn is_close_line(&self) -> bool {
        self.close_line
    }

    /// Whether the contour the cursor is currently in ends with a close
    /// verb (always true under `force_close`).
    pub fn is_closed_contour(&self) -> bool {
        if self.verbs.is_empty() || self.verb_index >= self.verbs.len() {
            return false;
        }
        if self.force_close {
            return true;
        }
        let mut i = self.verb_index;
        if self.verbs[i] == Verb::Move {
            i += 1;
        }
        while i < self.verbs.len() {
            match self.verbs[i] {
                Verb::Move => break,
                Verb::Close => return true,
                _ => i += 1,
            }
        }
        false
    }

    // Emits the synthetic closing line, or the close itself once the
    // contour has returned to its move point.
    fn auto_close(&mut self) -> PathEvent {
        if !same_point(self.last_pt, self.move_pt) {
            let from = self.last_pt;
            self.last_pt = self.move_pt;
            self.close_line = true;
            PathEvent::Line {
                from,
                to: self.move_pt,
            }
        } else {
            self.need_close = false;
            self.close_line = false;
            self.last_pt = self.move_pt;
            PathEvent::Close {
                last: self.move_pt,
                first: self.move_pt,
            }
        }
    }

    /// The next event, or `None` at end of stream. (This is the `Iterator`
    /// implementation as an inherent method, so state queries stay
    /// available mid-loop.)
    pub fn next_event(&mut self) -> Option<PathEvent> {
        if self.verb_index == self.verbs.len() {
            // Close out the trailing contour if requested.
            if self.need_close {
                return Some(self.auto_close());
            }
            return None;
        }

        let verb = self.verbs[self.verb_index];
        self.verb_index += 1;

        match verb {
            Verb::Move => {
                if self.need_close {
                    // Revisit this move after the close is fully emitted.
                    self.verb_index -= 1;
                    return Some(self.auto_close());
                }
                if self.verb_index == self.verbs.len() {
                    // A trailing lone move adds no geometry.
                    return None;
                }
                let at = self.points[self.point_index];
                self.point_index += 1;
                self.move_pt = at;
                self.last_pt = at;
                self.need_close = self.force_close;
                Some(PathEvent::Move { at })
            }
            Verb::Line => {
                let from = self.last_pt;
                let to = self.points[self.point_index];
                self.point_index += 1;
                self.last_pt = to;
                self.close_line = false;
                Some(PathEvent::Line { from, to })
            }
            Verb::Quad => {
                let from = self.last_pt;
                let ctrl = self.points[self.point_index];
                let to = self.points[self.point_index + 1];
                self.point_index += 2;
                self.last_pt = to;
                Some(PathEvent::Quadratic { from, ctrl, to })
            }
            Verb::Conic => {
                let from = self.last_pt;
                let ctrl = self.points[self.point_index];
                let to = self.points[self.point_index + 1];
                self.point_index += 2;
                let weight = self.weights[self.weight_index];
                self.weight_index += 1;
                self.last_pt = to;
                Some(PathEvent::Conic {
                    from,
                    ctrl,
                    to,
                    weight,
                })
            }
            Verb::Cubic => {
                let from = self.last_pt;
                let ctrl1 = self.points[self.point_index];
                let ctrl2 = self.points[self.point_index + 1];
                let to = self.points[self.point_index + 2];
                self.point_index += 3;
                self.last_pt = to;
                Some(PathEvent::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                })
            }
            Verb::Close => {
                if !same_point(self.last_pt, self.move_pt) {
                    // Revisit the close once the synthetic line is out.
                    self.verb_index -= 1;
                    let from = self.last_pt;
                    self.last_pt = self.move_pt;
                    self.close_line = true;
                    return Some(PathEvent::Line {
                        from,
                        to: self.move_pt,
                    });
                }
                self.need_close = false;
                self.close_line = false;
                self.last_pt = self.move_pt;
                Some(PathEvent::Close {
                    last: self.move_pt,
                    first: self.move_pt,
                })
            }
        }
    }
}

impl<'l> Iterator for ContourIter<'l> {
    type Item = PathEvent;

    fn next(&mut self) -> Option<PathEvent> {
        self.next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn raw_iter_back_references_previous_point() {
        let mut path = Path::new();
        path.move_to(point(1.0, 1.0));
        path.quadratic_bezier_to(point(2.0, 2.0), point(3.0, 1.0));
        path.line_to(point(4.0, 0.0));

        let events: Vec<_> = path.iter().collect();
        assert_eq!(
            events,
            vec![
                PathEvent::Move { at: point(1.0, 1.0) },
                PathEvent::Quadratic {
                    from: point(1.0, 1.0),
                    ctrl: point(2.0, 2.0),
                    to: point(3.0, 1.0),
                },
                PathEvent::Line {
                    from: point(3.0, 1.0),
                    to: point(4.0, 0.0),
                },
            ]
        );
    }

    #[test]
    fn close_synthesizes_a_line_back_to_the_move() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(10.0, 0.0));
        path.close();

        let mut iter = path.contour_iter(false);
        assert_eq!(iter.next_event(), Some(PathEvent::Move { at: point(0.0, 0.0) }));
        assert!(iter.is_closed_contour());
        assert_eq!(
            iter.next_event(),
            Some(PathEvent::Line {
                from: point(0.0, 0.0),
                to: point(10.0, 0.0),
            })
        );
        assert!(!iter.is_close_line());
        assert_eq!(
            iter.next_event(),
            Some(PathEvent::Line {
                from: point(10.0, 0.0),
                to: point(0.0, 0.0),
            })
        );
        assert!(iter.is_close_line());
        assert_eq!(
            iter.next_event(),
            Some(PathEvent::Close {
                last: point(0.0, 0.0),
                first: point(0.0, 0.0),
            })
        );
        assert_eq!(iter.next_event(), None);
    }

    #[test]
    fn force_close_closes_open_contours() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(5.0, 0.0));
        path.move_to(point(10.0, 0.0));
        path.line_to(point(15.0, 0.0));

        let events: Vec<_> = path.contour_iter(true).collect();
        // Each contour gains a synthetic line home plus a close.
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, PathEvent::Close { .. }))
                .count(),
            2
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, PathEvent::Line { .. }))
                .count(),
            4
        );
    }

    #[test]
    fn trailing_lone_move_is_suppressed() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(1.0, 0.0));
        path.move_to(point(9.0, 9.0));

        let events: Vec<_> = path.contour_iter(false).collect();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn open_contour_without_force_close_stays_open() {
        let mut path = Path::new();
        path.move_to(point(0.0, 0.0));
        path.line_to(point(5.0, 5.0));

        let mut iter = path.contour_iter(false);
        iter.next_event();
        assert!(!iter.is_closed_contour());
        let events: Vec<_> = path.contour_iter(false).collect();
        assert_eq!(events.len(), 2);
    }
}

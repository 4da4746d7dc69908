//! Arc-length parametrization of a contour.
//!
//! [`ContourMeasure`] walks the first contour of a path once, flattening
//! each curve into an edge table that maps accumulated distance to a
//! `(segment, t)` pair. Queries then cost a binary search:
//!
//! - [`length`](ContourMeasure::length),
//! - [`pos_tan`](ContourMeasure::pos_tan) — position and unit tangent at a
//!   distance,
//! - [`segment`](ContourMeasure::segment) — extract the sub-path between
//!   two distances, preserving each curve's kind (a trimmed conic stays a
//!   conic, with a new weight).

use crate::math::{Point, Vector};
use crate::path::builder::Builder;
use crate::path::{Path, PathEvent};

use contour_path::geom::{ConicSegment, CubicBezierSegment, LineSegment, QuadraticBezierSegment};

use core::ops::Range;

enum Segment {
    Line(LineSegment),
    Quadratic(QuadraticBezierSegment),
    Conic(ConicSegment),
    Cubic(CubicBezierSegment),
}

impl Segment {
    fn sample(&self, t: f32) -> Point {
        match self {
            Segment::Line(s) => s.sample(t),
            Segment::Quadratic(s) => s.sample(t),
            Segment::Conic(s) => s.sample(t),
            Segment::Cubic(s) => s.sample(t),
        }
    }

    fn tangent(&self, t: f32) -> Vector {
        match self {
            Segment::Line(s) => s.to_vector(),
            Segment::Quadratic(s) => s.tangent(t),
            Segment::Conic(s) => s.tangent(t),
            Segment::Cubic(s) => s.tangent(t),
        }
    }

    fn push_range(&self, t_range: Range<f32>, builder: &mut Builder) {
        match self {
            Segment::Line(s) => {
                builder.line_to(s.sample(t_range.end));
            }
            Segment::Quadratic(s) => {
                let sub = s.split_range(t_range);
                builder.quadratic_bezier_to(sub.ctrl, sub.to);
            }
            Segment::Conic(s) => match s.split_range(t_range.clone()) {
                Some(sub) => {
                    builder.conic_to(sub.ctrl, sub.to, sub.w);
                }
                // The projective split can overflow on wild coordinates;
                // the chord is the only sane answer left.
                None => {
                    builder.line_to(s.sample(t_range.end));
                }
            },
            Segment::Cubic(s) => {
                let sub = s.split_range(t_range);
                builder.cubic_bezier_to(sub.ctrl1, sub.ctrl2, sub.to);
            }
        }
    }
}

struct Edge {
    // Accumulated distance at the end of this edge.
    distance: f32,
    segment: u32,
    // Curve parameter at the end of this edge.
    t: f32,
}

/// Cached arc-length measurements over the first contour of a path.
pub struct ContourMeasure {
    segments: Vec<Segment>,
    edges: Vec<Edge>,
    length: f32,
}

const MAX_FLATTEN_DEPTH: u32 = 10;

fn flat_enough_quad(from: Point, ctrl: Point, to: Point, tolerance: f32) -> bool {
    // Deviation of the control point from the chord midpoint bounds the
    // curve's deviation to a quarter of it.
    let dev = (from.to_vector() - ctrl.to_vector() * 2.0 + to.to_vector()) * 0.25;
    dev.square_length() <= tolerance * tolerance
}

fn flat_enough_cubic(c: &CubicBezierSegment, tolerance: f32) -> bool {
    let d1 = c.from.to_vector() - c.ctrl1.to_vector() * 2.0 + c.ctrl2.to_vector();
    let d2 = c.ctrl1.to_vector() - c.ctrl2.to_vector() * 2.0 + c.to.to_vector();
    let limit = tolerance * tolerance;
    d1.square_length() <= limit && d2.square_length() <= limit
}

impl ContourMeasure {
    /// Measures the first contour of `path`, flattening curves with the
    /// given tolerance (maximum distance between a curve and its
    /// approximation).
    pub fn from_path(path: &Path, tolerance: f32) -> Self {
        let tolerance = tolerance.max(1e-4);
        let mut measure = ContourMeasure {
            segments: Vec::new(),
            edges: Vec::new(),
            length: 0.0,
        };

        let mut seen_contour = false;
        for event in path.contour_iter(false) {
            match event {
                PathEvent::Move { .. } => {
                    if seen_contour {
                        break;
                    }
                    seen_contour = true;
                }
                PathEvent::Line { from, to } => {
                    measure.add_segment(Segment::Line(LineSegment { from, to }), tolerance);
                }
                PathEvent::Quadratic { from, ctrl, to } => {
                    measure.add_segment(
                        Segment::Quadratic(QuadraticBezierSegment { from, ctrl, to }),
                        tolerance,
                    );
                }
                PathEvent::Conic { from, ctrl, to, weight } => {
                    measure.add_segment(
                        Segment::Conic(ConicSegment { from, ctrl, to, w: weight }),
                        tolerance,
                    );
                }
                PathEvent::Cubic { from, ctrl1, ctrl2, to } => {
                    measure.add_segment(
                        Segment::Cubic(CubicBezierSegment { from, ctrl1, ctrl2, to }),
                        tolerance,
                    );
                }
                PathEvent::Close { .. } => break,
            }
        }

        measure
    }

    /// Total arc length of the measured contour.
    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Position and unit tangent at `distance`, clamped to the contour.
    /// `None` only for an empty contour.
    pub fn pos_tan(&self, distance: f32) -> Option<(Point, Vector)> {
        let (segment, t) = self.distance_to_t(distance)?;
        let segment = &self.segments[segment as usize];
        let pos = segment.sample(t);
        let mut tangent = segment.tangent(t);
        let len = tangent.length();
        if len > 0.0 {
            tangent = tangent / len;
        }
        Some((pos, tangent))
    }

    /// Appends the sub-contour between distances `d0` and `d1` (clamped)
    /// onto `builder`. Returns false when the span is empty.
    pub fn segment(&self, d0: f32, d1: f32, builder: &mut Builder, start_with_move: bool) -> bool {
        let d0 = d0.clamp(0.0, self.length);
        let d1 = d1.clamp(0.0, self.length);
        if !(d0 < d1) || self.segments.is_empty() {
            return false;
        }

        let (seg0, t0) = match self.distance_to_t(d0) {
            Some(v) => v,
            None => return false,
        };
        let (seg1, t1) = match self.distance_to_t(d1) {
            Some(v) => v,
            None => return false,
        };

        if start_with_move {
            builder.move_to(self.segments[seg0 as usize].sample(t0));
        }

        if seg0 == seg1 {
            self.segments[seg0 as usize].push_range(t0..t1, builder);
        } else {
            self.segments[seg0 as usize].push_range(t0..1.0, builder);
            for seg in (seg0 + 1)..seg1 {
                self.segments[seg as usize].push_range(0.0..1.0, builder);
            }
            if t1 > 0.0 {
                self.segments[seg1 as usize].push_range(0.0..t1, builder);
            }
        }
        true
    }

    fn add_segment(&mut self, segment: Segment, tolerance: f32) {
        let index = self.segments.len() as u32;
        let mut distance = self.length;
        match &segment {
            Segment::Line(line) => {
                let d = line.length();
                if d > 0.0 {
                    distance += d;
                    self.edges.push(Edge {
                        distance,
                        segment: index,
                        t: 1.0,
                    });
                }
            }
            _ => {
                self.flatten(&segment, index, 0.0, 1.0, tolerance, 0, &mut distance);
            }
        }
        if distance > self.length {
            self.length = distance;
            self.segments.push(segment);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn flatten(
        &mut self,
        segment: &Segment,
        index: u32,
        t0: f32,
        t1: f32,
        tolerance: f32,
        depth: u32,
        distance: &mut f32,
    ) {
        let flat = depth >= MAX_FLATTEN_DEPTH
            || match segment {
                Segment::Line(_) => true,
                Segment::Quadratic(q) => {
                    let sub = q.split_range(t0..t1);
                    flat_enough_quad(sub.from, sub.ctrl, sub.to, tolerance)
                }
                Segment::Conic(c) => {
                    // The conic's control polygon hull bounds it like a
                    // quad's.
                    match c.split_range(t0..t1) {
                        Some(sub) => flat_enough_quad(sub.from, sub.ctrl, sub.to, tolerance),
                        None => true,
                    }
                }
                Segment::Cubic(c) => flat_enough_cubic(&c.split_range(t0..t1), tolerance),
            };

        if flat {
            let d = (segment.sample(t1) - segment.sample(t0)).length();
            if d > 0.0 {
                *distance += d;
                self.edges.push(Edge {
                    distance: *distance,
                    segment: index,
                    t: t1,
                });
            }
            return;
        }

        let mid = (t0 + t1) * 0.5;
        self.flatten(segment, index, t0, mid, tolerance, depth + 1, distance);
        self.flatten(segment, index, mid, t1, tolerance, depth + 1, distance);
    }

    fn distance_to_t(&self, distance: f32) -> Option<(u32, f32)> {
        if self.edges.is_empty() {
            return None;
        }
        let distance = distance.clamp(0.0, self.length);
        let i = self
            .edges
            .partition_point(|e| e.distance < distance)
            .min(self.edges.len() - 1);
        let edge = &self.edges[i];
        let (d_lo, t_lo) = if i == 0 || self.edges[i - 1].segment != edge.segment {
            (
                if i == 0 { 0.0 } else { self.edges[i - 1].distance },
                0.0,
            )
        } else {
            (self.edges[i - 1].distance, self.edges[i - 1].t)
        };
        let span = edge.distance - d_lo;
        let ratio = if span > 0.0 { (distance - d_lo) / span } else { 1.0 };
        Some((edge.segment, t_lo + (edge.t - t_lo) * ratio))
    }
}

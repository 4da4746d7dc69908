//! Corner rounding.
//!
//! Rewalks each contour of the input, shortening every pair of adjacent
//! curves around their shared corner and inserting a single cubic bézier
//! arc fillet that meets both with matching unit tangents. Closed contours
//! also get a wrap-around fillet between their last and first curves.

use crate::algorithms::measure::ContourMeasure;
use crate::math::{Box2D, Matrix, Point, Vector};
use crate::path::builder::Builder;
use crate::path::{Path, PathEvent};
use crate::{PathEffect, StrokeRec};

use contour_path::geom::CubicBezierSegment;

// Start/end points closer than this are degenerate segments and dropped.
const DEGENERATE_TOLERANCE: f32 = 1e-4;

// Arc-length resolution: curves are measured roughly ten times finer than
// the default flattening.
const MEASURE_TOLERANCE: f32 = 0.1 / 10.0;

/// Replaces each corner between adjacent curves with a cubic arc fillet of
/// the given radius, shortening the neighboring curves so the fillet meets
/// them tangent-continuously.
#[derive(Clone, Debug)]
pub struct CornerPathEffect {
    radius: f32,
}

impl CornerPathEffect {
    /// A corner effect with the given fillet radius; `None` unless the
    /// radius is finite and positive.
    pub fn new(radius: f32) -> Option<Self> {
        if radius.is_finite() && radius > 0.0 {
            Some(CornerPathEffect { radius })
        } else {
            None
        }
    }
}

impl PathEffect for CornerPathEffect {
    fn filter_path(
        &self,
        dst: &mut Path,
        src: &Path,
        _rec: &mut StrokeRec,
        _cull_rect: Option<&Box2D>,
        _ctm: &Matrix,
    ) -> bool {
        let mut out = Builder::new();
        let mut contour: Vec<Curve> = Vec::new();
        let mut closed = false;

        let mut iter = src.contour_iter(false);
        while let Some(event) = iter.next_event() {
            match event {
                PathEvent::Move { .. } => {
                    flush_contour(&mut out, &mut contour, closed, self.radius);
                    closed = iter.is_closed_contour();
                }
                PathEvent::Close { .. } => {}
                _ => {
                    if let Some(curve) = Curve::from_event(&event) {
                        contour.push(curve);
                    }
                }
            }
        }
        flush_contour(&mut out, &mut contour, closed, self.radius);

        *dst = out.detach();
        dst.set_fill_rule(src.fill_rule());
        true
    }

    fn fast_bounds(&self, _bounds: &mut Box2D) -> bool {
        // Rounding corners only removes area; the source bounds still
        // cover the result.
        true
    }
}

// One curve of a contour, kept as a single-segment path so the arc-length
// measure can both query and trim it.
struct Curve {
    path: Path,
    length: f32,
}

impl Curve {
    fn from_event(event: &PathEvent) -> Option<Curve> {
        let (from, to) = match event {
            PathEvent::Line { from, to }
            | PathEvent::Quadratic { from, to, .. }
            | PathEvent::Conic { from, to, .. }
            | PathEvent::Cubic { from, to, .. } => (*from, *to),
            _ => return None,
        };
        if (to - from).length() <= DEGENERATE_TOLERANCE {
            return None;
        }

        let mut path = Path::new();
        path.move_to(from);
        match *event {
            PathEvent::Line { to, .. } => {
                path.line_to(to);
            }
            PathEvent::Quadratic { ctrl, to, .. } => {
                path.quadratic_bezier_to(ctrl, to);
            }
            PathEvent::Conic { ctrl, to, weight, .. } => {
                path.conic_to(ctrl, to, weight);
            }
            PathEvent::Cubic { ctrl1, ctrl2, to, .. } => {
                path.cubic_bezier_to(ctrl1, ctrl2, to);
            }
            _ => unreachable!(),
        }
        Curve::from_path(path)
    }

    fn from_path(path: Path) -> Option<Curve> {
        let measure = ContourMeasure::from_path(&path, MEASURE_TOLERANCE);
        let length = measure.length();
        if length <= 0.0 {
            return None;
        }
        Some(Curve { path, length })
    }

    fn measure(&self) -> ContourMeasure {
        ContourMeasure::from_path(&self.path, MEASURE_TOLERANCE)
    }

    fn start_point(&self) -> Point {
        self.path.point(0)
    }

    /// Replaces this curve by its arc-length sub-range. Fails (leaving the
    /// curve untouched) when the range collapses.
    fn trim(&mut self, d0: f32, d1: f32) -> bool {
        let mut builder = Builder::new();
        if !self.measure().segment(d0, d1, &mut builder, true) {
            return false;
        }
        match Curve::from_path(builder.detach()) {
            Some(trimmed) => {
                *self = trimmed;
                true
            }
            None => false,
        }
    }

    /// Appends this curve's verbs (without its leading move) onto `out`.
    fn append_to(&self, out: &mut Builder) {
        for event in self.path.iter() {
            match event {
                PathEvent::Move { .. } | PathEvent::Close { .. } => {}
                PathEvent::Line { to, .. } => {
                    out.line_to(to);
                }
                PathEvent::Quadratic { ctrl, to, .. } => {
                    out.quadratic_bezier_to(ctrl, to);
                }
                PathEvent::Conic { ctrl, to, weight, .. } => {
                    out.conic_to(ctrl, to, weight);
                }
                PathEvent::Cubic { ctrl1, ctrl2, to, .. } => {
                    out.cubic_bezier_to(ctrl1, ctrl2, to);
                }
            }
        }
    }
}

/// The arc fillet bridging two adjacent curves, built by trimming both so
/// the arc's endpoints land on them with matching tangents.
///
/// `start_limit`/`end_limit` bound how much of each curve the fillet may
/// consume. On success both curves are trimmed and the connecting cubic is
/// returned; on failure (straight-through or fully degenerate corners)
/// both curves stay untouched.
fn build_corner_curve(
    start_curve: &mut Curve,
    start_limit: f32,
    end_curve: &mut Curve,
    end_limit: f32,
    radius: f32,
) -> Option<CubicBezierSegment> {
    let start_measure = start_curve.measure();
    let end_measure = end_curve.measure();

    let (_, tan_in) = start_measure.pos_tan(start_curve.length)?;
    let (_, tan_out) = end_measure.pos_tan(0.0)?;

    // Walking backwards along the incoming curve and forwards along the
    // outgoing one; antiparallel means the joint is already straight.
    let u: Vector = -tan_in;
    let v: Vector = tan_out;
    let dot = u.dot(v).clamp(-1.0, 1.0);
    if dot < -(1.0 - DEGENERATE_TOLERANCE) {
        return None;
    }

    let theta = dot.acos();
    let tan_half = (theta * 0.5).tan();
    let mut dist = if tan_half > 1e-6 {
        radius / tan_half
    } else {
        f32::INFINITY
    };
    dist = dist.min(start_limit).min(end_limit);
    if !(dist > 0.0) || !dist.is_finite() {
        return None;
    }

    let (p1, dir1) = start_measure.pos_tan(start_curve.length - dist)?;
    let (p2, dir2) = end_measure.pos_tan(dist)?;

    // The sweep of the fillet arc is the turn between the two tangent
    // directions; its radius reflects the clamped tangent distance.
    let arc_radius = dist * tan_half;
    let cos_phi = dir1.dot(dir2).clamp(-1.0, 1.0);
    let phi = cos_phi.acos();
    let sin_half_phi = (phi * 0.5).sin();
    if sin_half_phi <= 1e-6 {
        return None;
    }
    let handle = (4.0 * (1.0 - (phi * 0.5).cos())) / (3.0 * sin_half_phi) * arc_radius;

    let start_len = start_curve.length;
    let end_len = end_curve.length;
    if !start_curve.trim(0.0, start_len - dist) {
        return None;
    }
    if !end_curve.trim(dist, end_len) {
        // Restore symmetry is not required: the start curve was genuinely
        // shortened to the fillet's entry point, and with no exit curve
        // left the fillet cannot be drawn; give up on this corner.
        return None;
    }

    Some(CubicBezierSegment {
        from: p1,
        ctrl1: p1 + dir1 * handle,
        ctrl2: p2 - dir2 * handle,
        to: p2,
    })
}

fn flush_contour(out: &mut Builder, curves: &mut Vec<Curve>, closed: bool, radius: f32) {
    if curves.is_empty() {
        return;
    }

    if curves.len() == 1 {
        let curve = &curves[0];
        out.move_to(curve.start_point());
        curve.append_to(out);
        if closed {
            out.close();
        }
        curves.clear();
        return;
    }

    // The wrap-around fillet joins the contour's last curve back onto its
    // first one.
    let wrap_fillet = if closed {
        let (head, tail) = curves.split_at_mut(1);
        let first = &mut head[0];
        let last = tail.last_mut().unwrap();
        build_corner_curve(
            last,
            last.length * 0.5,
            first,
            first.length * 0.5,
            radius,
        )
    } else {
        None
    };

    match &wrap_fillet {
        Some(fillet) => {
            out.move_to(fillet.from);
            out.cubic_bezier_to(fillet.ctrl1, fillet.ctrl2, fillet.to);
        }
        None => {
            out.move_to(curves[0].start_point());
        }
    }

    let curves_len = curves.len();
    for i in 0..curves_len - 1 {
        let (left, right) = curves.split_at_mut(i + 1);
        let start_curve = &mut left[i];
        let end_curve = &mut right[0];

        let start_limit = if i == 0 && !closed {
            start_curve.length
        } else {
            start_curve.length * 0.5
        };
        let end_limit = if i + 1 == curves_len - 1 && !closed {
            end_curve.length
        } else {
            end_curve.length * 0.5
        };

        let fillet = build_corner_curve(start_curve, start_limit, end_curve, end_limit, radius);
        start_curve.append_to(out);
        if let Some(fillet) = fillet {
            out.cubic_bezier_to(fillet.ctrl1, fillet.ctrl2, fillet.to);
        }
    }

    curves.last().unwrap().append_to(out);
    if closed {
        out.close();
    }
    curves.clear();
}

//! The shared, reference-counted body behind path values.
//!
//! A [`PathData`] holds the three parallel streams (verbs, points, conic
//! weights) and the caches computed from them. Path values share one body
//! through an `Arc`; any mutation goes through `Arc::make_mut`, which deep
//! copies the body when it is co-owned. That is the whole copy-on-write
//! story: a body is only ever mutated while uniquely owned.

use crate::math::{Box2D, Matrix, Point};
use crate::{segment_mask, Verb};

use contour_geom::scalar::are_finite;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

/// Bounds of the point array, plus whether every point was finite.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct CachedBounds {
    pub bounds: Box2D,
    pub is_finite: bool,
}

/// Remembers that the verb stream is the canonical oval or round-rect
/// sequence, which corner starts it and which way it winds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ShapeHint {
    None,
    Oval { ccw: bool, start: u8 },
    RRect { ccw: bool, start: u8 },
}

const EMPTY_GEN_ID: u32 = 1;

#[derive(Debug)]
pub(crate) struct PathData {
    pub verbs: Vec<Verb>,
    pub points: Vec<Point>,
    pub weights: Vec<f32>,
    pub segment_mask: u8,
    pub hint: ShapeHint,
    bounds: OnceLock<CachedBounds>,
    // 0 means "unassigned"; equal non-zero ids imply equal bodies.
    gen_id: AtomicU32,
}

impl PathData {
    pub fn new() -> Self {
        PathData {
            verbs: Vec::new(),
            points: Vec::new(),
            weights: Vec::new(),
            segment_mask: 0,
            hint: ShapeHint::None,
            bounds: OnceLock::new(),
            gen_id: AtomicU32::new(0),
        }
    }

    /// The process-wide shared empty body. `Path::default` and `reset` hand
    /// out clones of this `Arc`; it is never mutated because every editor
    /// copies a co-owned body first.
    pub fn shared_empty() -> Arc<PathData> {
        static EMPTY: OnceLock<Arc<PathData>> = OnceLock::new();
        EMPTY
            .get_or_init(|| {
                let data = PathData::new();
                // Warm the bounds cache up front so no two threads race to
                // be the first to do it.
                data.bounds();
                data.gen_id.store(EMPTY_GEN_ID, Ordering::Relaxed);
                Arc::new(data)
            })
            .clone()
    }

    /// Invalidate everything an edit can change. Called by every editor
    /// entry point before touching the streams.
    pub fn mark_dirty(&mut self) {
        self.bounds = OnceLock::new();
        *self.gen_id.get_mut() = 0;
        self.hint = ShapeHint::None;
    }

    /// Appends one verb (and its weight for conics) and returns the slice
    /// of freshly grown points for the caller to fill in.
    pub fn grow_for_verb(&mut self, verb: Verb, weight: f32) -> &mut [Point] {
        self.segment_mask |= mask_for(verb);
        let advance = verb.point_advance();
        self.verbs.push(verb);
        if verb == Verb::Conic {
            self.weights.push(weight);
        }
        let start = self.points.len();
        self.points.resize(start + advance, Point::zero());
        &mut self.points[start..]
    }

    /// Appends `n` consecutive verbs of the same kind.
    pub fn grow_for_repeated_verb(&mut self, verb: Verb, n: usize) -> &mut [Point] {
        debug_assert!(verb != Verb::Conic);
        self.segment_mask |= mask_for(verb);
        self.verbs.resize(self.verbs.len() + n, verb);
        let start = self.points.len();
        self.points.resize(start + verb.point_advance() * n, Point::zero());
        &mut self.points[start..]
    }

    /// Bulk-appends another body's raw streams; the returned slices map the
    /// new points and weights so the caller can transform them in place.
    pub fn grow_for_data(&mut self, other: &PathData) -> (&mut [Point], &mut [f32]) {
        self.segment_mask |= other.segment_mask;
        self.verbs.extend_from_slice(&other.verbs);
        let pts_start = self.points.len();
        let w_start = self.weights.len();
        self.points.extend_from_slice(&other.points);
        self.weights.extend_from_slice(&other.weights);
        (&mut self.points[pts_start..], &mut self.weights[w_start..])
    }

    /// Truncates the streams but keeps their allocations.
    pub fn rewind(&mut self) {
        self.mark_dirty();
        self.verbs.clear();
        self.points.clear();
        self.weights.clear();
        self.segment_mask = 0;
    }

    pub fn bounds(&self) -> CachedBounds {
        *self.bounds.get_or_init(|| compute_bounds(&self.points))
    }

    pub fn has_computed_bounds(&self) -> bool {
        self.bounds.get().is_some()
    }

    /// Installs bounds computed by the caller (e.g. when appending a whole
    /// shape whose bounds are known), skipping the full recompute.
    pub fn set_bounds(&mut self, bounds: Box2D, is_finite: bool) {
        self.bounds = OnceLock::new();
        let _ = self.bounds.set(CachedBounds { bounds, is_finite });
    }

    /// A non-zero id identifying the current content. Two bodies with the
    /// same id are equal; ids are lazily assigned and reset on every edit.
    pub fn gen_id(&self) -> u32 {
        let mut id = self.gen_id.load(Ordering::Relaxed);
        if id == 0 {
            if self.verbs.is_empty() && self.points.is_empty() {
                id = EMPTY_GEN_ID;
            } else {
                static NEXT_ID: AtomicU32 = AtomicU32::new(EMPTY_GEN_ID + 1);
                loop {
                    id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
                    if id != 0 && id != EMPTY_GEN_ID {
                        break;
                    }
                }
            }
            self.gen_id.store(id, Ordering::Relaxed);
        }
        id
    }
}

impl Clone for PathData {
    fn clone(&self) -> Self {
        let bounds = OnceLock::new();
        if let Some(cached) = self.bounds.get() {
            let _ = bounds.set(*cached);
        }
        PathData {
            verbs: self.verbs.clone(),
            points: self.points.clone(),
            weights: self.weights.clone(),
            segment_mask: self.segment_mask,
            hint: self.hint,
            bounds,
            // The clone is about to be edited (that is the only reason
            // bodies are cloned), so it starts dirty.
            gen_id: AtomicU32::new(0),
        }
    }
}

impl PartialEq for PathData {
    fn eq(&self, other: &Self) -> bool {
        // The segment mask is just a cache of the verb stream but comparing
        // it first rejects most mismatches for free.
        if self.segment_mask != other.segment_mask {
            return false;
        }
        let a = self.gen_id.load(Ordering::Relaxed);
        let b = other.gen_id.load(Ordering::Relaxed);
        if a != 0 && a == b {
            return true;
        }
        self.verbs == other.verbs && self.points == other.points && self.weights == other.weights
    }
}

impl Default for PathData {
    fn default() -> Self {
        PathData::new()
    }
}

#[inline]
fn mask_for(verb: Verb) -> u8 {
    match verb {
        Verb::Line => segment_mask::LINE,
        Verb::Quad => segment_mask::QUAD,
        Verb::Conic => segment_mask::CONIC,
        Verb::Cubic => segment_mask::CUBIC,
        Verb::Move | Verb::Close => 0,
    }
}

fn compute_bounds(points: &[Point]) -> CachedBounds {
    if points.is_empty() {
        return CachedBounds {
            bounds: Box2D::zero(),
            is_finite: true,
        };
    }
    let mut min = points[0];
    let mut max = points[0];
    let mut accum = 0.0f32;
    for p in points {
        accum *= p.x;
        accum *= p.y;
        min = min.min(*p);
        max = max.max(*p);
    }
    // `accum` only stays zero when every coordinate was finite.
    if accum == 0.0 {
        CachedBounds {
            bounds: Box2D { min, max },
            is_finite: true,
        }
    } else {
        CachedBounds {
            bounds: Box2D::zero(),
            is_finite: false,
        }
    }
}

/// Produces a destination body for an affine (non-perspective) transform:
/// points are mapped elementwise, verb and weight streams are copied
/// unchanged, and the caches are transferred when that is sound.
pub(crate) fn transformed(src: &PathData, matrix: &Matrix) -> PathData {
    debug_assert!(!matrix.has_perspective());

    let mut dst = PathData::new();
    dst.verbs = src.verbs.clone();
    dst.weights = src.weights.clone();
    dst.segment_mask = src.segment_mask;
    dst.points = src.points.iter().map(|p| matrix.map_point(*p)).collect();

    // Transferring the cached bounds only makes sense when the mapped rect
    // is exactly the mapped points' bounds, i.e. when rects stay rects. A
    // path with zero or one points keeps an empty bounds rect no matter
    // the matrix, so recomputing is the correct choice there.
    if matrix.rect_stays_rect() && src.points.len() > 1 {
        if let Some(cached) = src.bounds.get() {
            if cached.is_finite {
                let mapped = matrix.map_box(&cached.bounds);
                let coords = [mapped.min.x, mapped.min.y, mapped.max.x, mapped.max.y];
                if are_finite(&coords) {
                    let _ = dst.bounds.set(CachedBounds {
                        bounds: mapped,
                        is_finite: true,
                    });
                } else {
                    let _ = dst.bounds.set(CachedBounds {
                        bounds: Box2D::zero(),
                        is_finite: false,
                    });
                }
            } else {
                let _ = dst.bounds.set(CachedBounds {
                    bounds: Box2D::zero(),
                    is_finite: false,
                });
            }
        }
    }

    dst.hint = if matrix.rect_stays_rect() {
        match src.hint {
            ShapeHint::None => ShapeHint::None,
            ShapeHint::Oval { ccw, start } => {
                let (ccw, start) = transform_dir_and_start(matrix, false, ccw, start);
                ShapeHint::Oval { ccw, start }
            }
            ShapeHint::RRect { ccw, start } => {
                let (ccw, start) = transform_dir_and_start(matrix, true, ccw, start);
                ShapeHint::RRect { ccw, start }
            }
        }
    } else {
        ShapeHint::None
    };

    dst
}

/// Closed-form update of a shape hint's direction and start index under a
/// rect-stays-rect matrix, driven by the signs of its non-zero entries.
fn transform_dir_and_start(matrix: &Matrix, is_rrect: bool, ccw: bool, start: u8) -> (bool, u8) {
    let mut in_start = start as u32;
    // Round-rects have two indices per side; reduce to oval indices and
    // remember the remainder.
    let mut rm = 0;
    if is_rrect {
        rm = in_start & 1;
        in_start /= 2;
    }

    // Which of the diagonal / antidiagonal is non-zero, whether the
    // non-zero top-row entry is negative, and whether the two non-zero
    // entries share a sign.
    let (antidiag, top_neg, same_sign): (u32, u32, u32) = if matrix.sx != 0.0 {
        if matrix.sx > 0.0 {
            (0b00, 0b00, if matrix.sy > 0.0 { 1 } else { 0 })
        } else {
            (0b00, 0b10, if matrix.sy > 0.0 { 0 } else { 1 })
        }
    } else if matrix.kx > 0.0 {
        (0b01, 0b00, if matrix.ky > 0.0 { 1 } else { 0 })
    } else {
        (0b01, 0b10, if matrix.ky > 0.0 { 0 } else { 1 })
    };

    let (ccw, mut out_start) = if same_sign != antidiag {
        // Rotation (possibly with scale): direction is unchanged.
        (ccw, (in_start + 4 - (top_neg | antidiag)) % 4)
    } else {
        // Mirror (possibly with scale): direction flips.
        rm = if is_rrect { 1 - rm } else { rm };
        (!ccw, (6 + (top_neg | antidiag) - in_start) % 4)
    };
    if is_rrect {
        out_start = 2 * out_start + rm;
    }
    (ccw, out_start as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn empty_body_is_shared() {
        let a = PathData::shared_empty();
        let b = PathData::shared_empty();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.bounds().is_finite);
        assert_eq!(a.bounds().bounds, Box2D::zero());
        assert_eq!(a.gen_id(), b.gen_id());
    }

    #[test]
    fn grown_points_line_up_with_verbs() {
        let mut data = PathData::new();
        data.grow_for_verb(Verb::Move, 0.0)[0] = point(1.0, 2.0);
        data.grow_for_verb(Verb::Conic, 0.5)[0] = point(3.0, 4.0);
        assert_eq!(data.verbs.len(), 2);
        assert_eq!(data.points.len(), 3);
        assert_eq!(data.weights, [0.5]);
        assert_eq!(data.segment_mask, segment_mask::CONIC);
    }

    #[test]
    fn bounds_of_non_finite_points_are_empty() {
        let mut data = PathData::new();
        let pts = data.grow_for_verb(Verb::Move, 0.0);
        pts[0] = point(f32::NAN, 0.0);
        let cached = data.bounds();
        assert!(!cached.is_finite);
        assert_eq!(cached.bounds, Box2D::zero());
    }

    #[test]
    fn gen_id_short_circuits_equality() {
        let mut a = PathData::new();
        a.grow_for_verb(Verb::Move, 0.0)[0] = point(1.0, 1.0);
        let b = a.clone();
        assert_eq!(a, b);
        // Ids assigned independently must stay distinct.
        assert_ne!(a.gen_id(), b.gen_id());
        // ... yet the bodies still compare equal elementwise.
        assert_eq!(a, b);
    }

    #[test]
    fn hint_orientation_under_quarter_rotation() {
        // 90° clockwise rotation in y-down coordinates: (x, y) -> (-y, x).
        let m = Matrix::row_major(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let (ccw, start) = transform_dir_and_start(&m, false, false, 1);
        assert!(!ccw);
        // Rotation branch: start = (1 + 4 - (topNeg | antidiag)) % 4 = 2.
        assert_eq!(start, 2);

        // A mirror across x flips the direction.
        let m = Matrix::scale(-1.0, 1.0);
        let (ccw, _) = transform_dir_and_start(&m, false, false, 1);
        assert!(ccw);
    }
}

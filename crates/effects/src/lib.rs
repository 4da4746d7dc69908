#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]

//! Geometric path effects.
//!
//! This crate is reexported in [contour](https://docs.rs/contour/).
//!
//! A [`PathEffect`] transforms the geometry of a path before it is filled
//! or stroked. The effect receives the stroke record and may rewrite it
//! (an effect that consumes the stroke hands back fill geometry). The one
//! concrete effect here is [`CornerPathEffect`], which replaces corners
//! with tangent-continuous circular-arc fillets.

pub use contour_algorithms as algorithms;
pub use contour_path as path;
pub use contour_path::geom;
pub use contour_path::math;
pub use contour_stroke::StrokeRec;

pub mod corner;

#[doc(inline)]
pub use crate::corner::CornerPathEffect;

use crate::math::{Box2D, Matrix};
use crate::path::Path;

/// A geometry filter applied to paths before rasterization.
pub trait PathEffect {
    /// Applies the effect to `src`, writing the result into `dst`.
    ///
    /// `rec` is the stroking state, which the effect may rewrite;
    /// `cull_rect` optionally bounds the area the caller cares about and
    /// `ctm` is the transform the result will be drawn under. Returns
    /// `false` when the effect does not apply (the caller then uses `src`
    /// unchanged).
    fn filter_path(
        &self,
        dst: &mut Path,
        src: &Path,
        rec: &mut StrokeRec,
        cull_rect: Option<&Box2D>,
        ctm: &Matrix,
    ) -> bool;

    /// Adjusts `bounds` (the source's fast bounds) to cover the effect's
    /// output. Returns `false` when the effect cannot promise any bound.
    fn fast_bounds(&self, _bounds: &mut Box2D) -> bool {
        false
    }
}

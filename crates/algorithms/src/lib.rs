#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]

//! Algorithms on top of [contour_path](https://docs.rs/contour_path/).
//!
//! This crate is reexported in [contour](https://docs.rs/contour/).

pub use contour_path as path;
pub use contour_path::geom;
pub use contour_path::math;

pub mod measure;

#[doc(inline)]
pub use crate::measure::ContourMeasure;

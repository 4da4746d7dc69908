#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::excessive_precision)]

//! Simple 2D geometric primitives on top of euclid.
//!
//! This crate is reexported in [contour](https://docs.rs/contour/).
//!
//! # Overview.
//!
//! This crate implements the maths the path crates are built on:
//!
//! - line segments,
//! - quadratic and cubic bézier curves,
//! - rational quadratic (conic) curves,
//! - 3×3 transforms with an explicit perspective flag,
//! - rounded rectangles.
//!
//! All of it is single precision: paths store `f32` coordinates and the
//! numerical guards in this crate are tuned for that.

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod conic;
pub mod cubic_bezier;
mod line;
pub mod matrix;
pub mod quadratic_bezier;
pub mod rrect;
pub mod scalar;
pub mod utils;

#[doc(inline)]
pub use crate::conic::ConicSegment;
#[doc(inline)]
pub use crate::cubic_bezier::CubicBezierSegment;
#[doc(inline)]
pub use crate::line::LineSegment;
#[doc(inline)]
pub use crate::matrix::Matrix;
#[doc(inline)]
pub use crate::quadratic_bezier::QuadraticBezierSegment;
#[doc(inline)]
pub use crate::rrect::{Corner, RoundedRect, RoundedRectKind};

/// Alias for `euclid::default::Point2D<f32>`.
pub type Point = euclid::default::Point2D<f32>;

/// Alias for `euclid::default::Vector2D<f32>`.
pub type Vector = euclid::default::Vector2D<f32>;

/// Alias for `euclid::default::Size2D<f32>`.
pub type Size = euclid::default::Size2D<f32>;

/// Alias for `euclid::default::Box2D<f32>`.
pub type Box2D = euclid::default::Box2D<f32>;

/// Shorthand for `Vector::new(x, y)`.
#[inline]
pub fn vector(x: f32, y: f32) -> Vector {
    Vector::new(x, y)
}

/// Shorthand for `Point::new(x, y)`.
#[inline]
pub fn point(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Shorthand for `Size::new(w, h)`.
#[inline]
pub fn size(w: f32, h: f32) -> Size {
    Size::new(w, h)
}

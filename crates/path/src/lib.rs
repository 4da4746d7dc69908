#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! Data structures to build, store and inspect 2D vector paths.
//!
//! This crate is reexported in [contour](https://docs.rs/contour/).
//!
//! A [Path] is an immutable-after-edit sequence of contours made of move,
//! line, quadratic, conic (rational quadratic) and cubic verbs, backed by a
//! reference-counted body that value-copies share until one of them is
//! edited. Metadata (bounds, convexity, winding direction, shape
//! recognition) is computed lazily and cached.
//!
//! # Examples
//!
//! ```
//! use contour_path::Path;
//! use contour_path::math::point;
//!
//! let mut builder = Path::builder();
//! builder.move_to(point(0.0, 0.0));
//! builder.line_to(point(10.0, 0.0));
//! builder.quadratic_bezier_to(point(10.0, 10.0), point(0.0, 10.0));
//! builder.close();
//! let path = builder.detach();
//!
//! for event in path.iter() {
//!     println!("{event:?}");
//! }
//! ```

pub use contour_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod builder;
mod convexity;
mod data;
mod events;
mod hit_test;
pub mod iterator;
pub mod path;
mod shape;

#[doc(inline)]
pub use crate::builder::Builder;
pub use crate::events::PathEvent;
#[doc(inline)]
pub use crate::iterator::{ContourIter, Iter};
#[doc(inline)]
pub use crate::path::Path;

pub mod math {
    //! f32 geometry types used everywhere, reexported from contour_geom.

    pub use contour_geom::{point, size, vector, Box2D, Matrix, Point, Size, Vector};
}

use core::fmt;

/// A tag controlling how a slice of the point stream is interpreted.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Verb {
    Move,
    Line,
    Quad,
    Conic,
    Cubic,
    Close,
}

impl Verb {
    /// How many points the verb appends to the point stream.
    #[inline]
    pub fn point_advance(self) -> usize {
        match self {
            Verb::Move | Verb::Line => 1,
            Verb::Quad | Verb::Conic => 2,
            Verb::Cubic => 3,
            Verb::Close => 0,
        }
    }
}

/// Bits recording which curve kinds appear in a path.
pub mod segment_mask {
    pub const LINE: u8 = 1 << 0;
    pub const QUAD: u8 = 1 << 1;
    pub const CONIC: u8 = 1 << 2;
    pub const CUBIC: u8 = 1 << 3;
}

/// The fill rule defines how to determine what is inside and what is
/// outside of the shape. "Inverse" swaps interior and exterior.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    #[default]
    Winding = 0,
    EvenOdd = 1,
    InverseWinding = 2,
    InverseEvenOdd = 3,
}

impl FillRule {
    #[inline]
    pub fn is_inverse(self) -> bool {
        (self as u8 & 2) != 0
    }

    #[inline]
    pub fn is_even_odd(self) -> bool {
        (self as u8 & 1) != 0
    }

    /// The same rule with the "inverse" bit flipped.
    #[inline]
    pub fn toggled_inverse(self) -> FillRule {
        match self {
            FillRule::Winding => FillRule::InverseWinding,
            FillRule::EvenOdd => FillRule::InverseEvenOdd,
            FillRule::InverseWinding => FillRule::Winding,
            FillRule::InverseEvenOdd => FillRule::EvenOdd,
        }
    }
}

/// The two possible orientations for a contour.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Clockwise, in a y-down coordinate system.
    Cw,
    /// Counter-clockwise, in a y-down coordinate system.
    Ccw,
}

impl Direction {
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Cw => Direction::Ccw,
            Direction::Ccw => Direction::Cw,
        }
    }
}

/// Convexity of a path, as cached on the path value.
///
/// `Unknown` is a cache-miss marker; queries never return it.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Convexity {
    Unknown = 0,
    Convex = 1,
    Concave = 2,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Cw => write!(f, "clockwise"),
            Direction::Ccw => write!(f, "counter-clockwise"),
        }
    }
}

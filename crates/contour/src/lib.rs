//! A headless 2D vector-path engine.
//!
//! `contour` represents planar paths built from move, line, quadratic,
//! conic (rational quadratic) and cubic verbs, and transforms them with
//! geometric filters: stroking with configurable caps, joins and widths,
//! and corner rounding. It does no rasterization, text layout or I/O; a
//! renderer embeds it and consumes the paths it produces.
//!
//! This crate only reexports its member crates:
//!
//! - [geom] — curve segments, transforms and rounded rects,
//! - [path] — the copy-on-write path value, builder and iterators,
//! - [algorithms] — arc-length measurement,
//! - [stroke] — the stroker,
//! - [effects] — path effects (corner rounding).
//!
//! # Examples
//!
//! ```
//! use contour::math::point;
//! use contour::path::Path;
//! use contour::stroke::{stroke_path, StrokeOptions};
//!
//! let mut builder = Path::builder();
//! builder.move_to(point(0.0, 0.0));
//! builder.quadratic_bezier_to(point(50.0, 50.0), point(100.0, 0.0));
//! let path = builder.detach();
//!
//! let outline = stroke_path(&path, &StrokeOptions::default().with_width(4.0));
//! assert!(!outline.is_empty());
//! ```

pub use contour_algorithms as algorithms;
pub use contour_effects as effects;
pub use contour_geom as geom;
pub use contour_path as path;
pub use contour_stroke as stroke;

pub use contour_path::math;

#[doc(inline)]
pub use contour_path::Path;

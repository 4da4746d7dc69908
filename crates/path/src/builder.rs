//! Path building utilities.
//!
//! A [`Builder`] is the mutable construction surface for
//! [`Path`](crate::path::Path) values. It records the same verb stream a
//! path stores, so building costs one allocation set and no translation.
//!
//! Two ways of getting a path out:
//!
//! - [`snapshot`](Builder::snapshot) publishes the current state as a path
//!   value that shares the builder's storage copy-on-write; the builder
//!   keeps going and a later edit quietly peels off its own copy.
//! - [`detach`](Builder::detach) moves the storage out and resets the
//!   builder.
//!
//! # Examples
//!
//! ```
//! use contour_path::Path;
//! use contour_path::math::point;
//!
//! let mut builder = Path::builder();
//! builder.move_to(point(0.0, 0.0));
//! builder.line_to(point(1.0, 0.0));
//! builder.line_to(point(1.0, 1.0));
//! builder.close();
//! let path = builder.detach();
//! assert_eq!(path.count_verbs(), 4);
//! ```

use crate::math::{Box2D, Matrix, Point};
use crate::path::{AddPathMode, Path};
use crate::{Direction, FillRule};

use contour_geom::rrect::RoundedRect;

/// Builds [`Path`] values incrementally.
#[derive(Clone, Default)]
pub struct Builder {
    path: Path,
}

impl Builder {
    pub fn new() -> Builder {
        Builder { path: Path::new() }
    }

    /// Publishes the current state without giving up the builder.
    ///
    /// The returned path shares the builder's storage; whichever side is
    /// edited next pays for the copy.
    pub fn snapshot(&self) -> Path {
        self.path.clone()
    }

    /// Moves the built path out and resets the builder to empty.
    pub fn detach(&mut self) -> Path {
        core::mem::take(&mut self.path)
    }

    /// Alias for [`detach`](Self::detach).
    pub fn build(&mut self) -> Path {
        self.detach()
    }

    pub fn reset(&mut self) -> &mut Self {
        self.path.reset();
        self
    }

    /// Empties the builder but keeps the storage for reuse.
    pub fn rewind(&mut self) -> &mut Self {
        self.path.rewind();
        self
    }

    pub fn set_fill_rule(&mut self, fill_rule: FillRule) -> &mut Self {
        self.path.set_fill_rule(fill_rule);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.path.last_point()
    }

    /// Rewrites the final point in place; on an empty builder this is a
    /// move.
    pub fn set_last_point(&mut self, p: Point) -> &mut Self {
        self.path.set_last_point(p);
        self
    }

    pub fn count_points(&self) -> usize {
        self.path.count_points()
    }

    /// Bounds of everything built so far.
    pub fn bounds(&self) -> Box2D {
        self.path.bounds()
    }

    /// Whether every point from `start_index` on coincides.
    pub fn is_zero_length_since_point(&self, start_index: usize) -> bool {
        self.path.is_zero_length_since_point(start_index)
    }

    //------------------------------------------------------------------
    // Verb primitives

    pub fn move_to(&mut self, at: Point) -> &mut Self {
        self.path.move_to(at);
        self
    }

    pub fn line_to(&mut self, to: Point) -> &mut Self {
        self.path.line_to(to);
        self
    }

    pub fn quadratic_bezier_to(&mut self, ctrl: Point, to: Point) -> &mut Self {
        self.path.quadratic_bezier_to(ctrl, to);
        self
    }

    pub fn conic_to(&mut self, ctrl: Point, to: Point, weight: f32) -> &mut Self {
        self.path.conic_to(ctrl, to, weight);
        self
    }

    pub fn cubic_bezier_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) -> &mut Self {
        self.path.cubic_bezier_to(ctrl1, ctrl2, to);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.path.close();
        self
    }

    //------------------------------------------------------------------
    // Shapes

    pub fn add_rect(&mut self, rect: &Box2D, dir: Direction, start_index: usize) -> &mut Self {
        self.path.add_rect(rect, dir, start_index);
        self
    }

    pub fn add_oval(&mut self, oval: &Box2D, dir: Direction, start_index: usize) -> &mut Self {
        self.path.add_oval(oval, dir, start_index);
        self
    }

    pub fn add_rrect(&mut self, rrect: &RoundedRect, dir: Direction, start_index: usize) -> &mut Self {
        self.path.add_rrect(rrect, dir, start_index);
        self
    }

    pub fn add_circle(&mut self, x: f32, y: f32, r: f32, dir: Direction) -> &mut Self {
        self.path.add_circle(x, y, r, dir);
        self
    }

    pub fn add_polygon(&mut self, points: &[Point], close: bool) -> &mut Self {
        self.path.add_polygon(points, close);
        self
    }

    pub fn add_path(&mut self, src: &Path, dx: f32, dy: f32, mode: AddPathMode) -> &mut Self {
        self.path.add_path(src, dx, dy, mode);
        self
    }

    pub fn add_path_with(&mut self, src: &Path, matrix: &Matrix, mode: AddPathMode) -> &mut Self {
        self.path.add_path_with(src, matrix, mode);
        self
    }

    pub fn reverse_add_path(&mut self, src: &Path) -> &mut Self {
        self.path.reverse_add_path(src);
        self
    }

    /// Appends `src`'s first contour reversed, without its trailing point,
    /// continuing the current contour. Used when an outline's inner wall is
    /// stitched to its outer wall.
    pub fn reverse_path_to(&mut self, src: &Path) -> &mut Self {
        let verbs = src.verbs();
        if verbs.is_empty() {
            return self;
        }
        let points = src.points();
        let weights = src.conic_weights();

        let mut pt_index = points.len() - 1;
        let mut weight_index = weights.len();

        for verb in verbs.iter().rev() {
            match verb {
                crate::Verb::Move => break, // reverse only the last contour
                crate::Verb::Line => {
                    pt_index -= 1;
                    self.line_to(points[pt_index]);
                }
                crate::Verb::Quad => {
                    pt_index -= 2;
                    self.quadratic_bezier_to(points[pt_index + 1], points[pt_index]);
                }
                crate::Verb::Conic => {
                    pt_index -= 2;
                    weight_index -= 1;
                    self.conic_to(points[pt_index + 1], points[pt_index], weights[weight_index]);
                }
                crate::Verb::Cubic => {
                    pt_index -= 3;
                    self.cubic_bezier_to(
                        points[pt_index + 2],
                        points[pt_index + 1],
                        points[pt_index],
                    );
                }
                crate::Verb::Close => {}
            }
        }
        self
    }

    /// Translates everything built so far.
    pub fn offset(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.path.offset(dx, dy);
        self
    }
}

use crate::math::Point;

/// One verb of a path, with its points resolved.
///
/// Curve events carry their starting point (the previous verb's last point)
/// so a consumer always sees the full curve without tracking state.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PathEvent {
    Move {
        at: Point,
    },
    Line {
        from: Point,
        to: Point,
    },
    Quadratic {
        from: Point,
        ctrl: Point,
        to: Point,
    },
    Conic {
        from: Point,
        ctrl: Point,
        to: Point,
        weight: f32,
    },
    Cubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
    /// End of a closed contour. The implicit closing line runs from `last`
    /// to `first` (they may be equal).
    Close {
        last: Point,
        first: Point,
    },
}

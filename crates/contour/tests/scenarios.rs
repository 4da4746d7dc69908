//! Cross-crate scenarios exercising the whole engine end to end.

use contour::effects::{CornerPathEffect, PathEffect};
use contour::geom::Matrix;
use contour::math::{point, Box2D};
use contour::path::{Direction, FillRule, Path, Verb};
use contour::stroke::{stroke_path, LineCap, StrokeOptions, StrokeRec};

fn rect(l: f32, t: f32, r: f32, b: f32) -> Box2D {
    Box2D {
        min: point(l, t),
        max: point(r, b),
    }
}

// The control hull of a two-cubic S-curve spans well past the filled area;
// the path promises only hull bounds.
#[test]
fn s_curve_control_bounds() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.cubic_bezier_to(point(75.0, 300.0), point(225.0, -300.0), point(300.0, 0.0));
    path.cubic_bezier_to(point(375.0, 300.0), point(525.0, -300.0), point(600.0, 0.0));

    assert_eq!(path.bounds(), rect(0.0, -300.0, 600.0, 300.0));

    // The curve itself never gets anywhere near the hull's y extremes, so
    // any filled point lies well inside the control bounds.
    assert!(!path.contains(75.0, 200.0));
    assert!(!path.contains(75.0, -200.0));
}

#[test]
fn rect_recognition_round_trip() {
    let mut path = Path::new();
    path.add_rect(&rect(100.0, 100.0, 200.0, 200.0), Direction::Cw, 0);

    let (out, closed, dir) = path.is_rect().expect("rect not recognized");
    assert_eq!(out, rect(100.0, 100.0, 200.0, 200.0));
    assert!(closed);
    assert_eq!(dir, Direction::Cw);
    assert_eq!(path.bounds(), out);
}

#[test]
fn oval_round_trip_through_builder() {
    let mut builder = Path::builder();
    builder.add_oval(&rect(0.0, 0.0, 100.0, 50.0), Direction::Cw, 1);
    let path = builder.snapshot();

    assert_eq!(path.is_oval(), Some(rect(0.0, 0.0, 100.0, 50.0)));
    assert_eq!(path.count_verbs(), 6);
    assert_eq!(
        path.verbs(),
        &[Verb::Move, Verb::Conic, Verb::Conic, Verb::Conic, Verb::Conic, Verb::Close]
    );
    for w in path.conic_weights() {
        assert!((w - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }
}

#[test]
fn winding_containment_of_a_rect() {
    let mut path = Path::new();
    path.add_rect(&rect(0.0, 0.0, 10.0, 10.0), Direction::Cw, 0);
    assert_eq!(path.fill_rule(), FillRule::Winding);

    assert!(path.contains(5.0, 5.0));
    assert!(!path.contains(-1.0, -1.0));
    assert!(!path.contains(10.0, 5.0)); // half-open right edge
    assert!(path.contains(0.0, 0.0));
}

#[test]
fn stroking_a_point_with_round_caps_makes_a_disc() {
    let mut path = Path::new();
    path.move_to(point(5.0, 5.0));
    path.close();

    let out = stroke_path(
        &path,
        &StrokeOptions::default().with_width(4.0).with_cap(LineCap::Round),
    );
    assert!(!out.is_empty());
    let bounds = out.bounds();
    assert!((bounds.min.x - 3.0).abs() < 1e-3);
    assert!((bounds.min.y - 3.0).abs() < 1e-3);
    assert!((bounds.max.x - 7.0).abs() < 1e-3);
    assert!((bounds.max.y - 7.0).abs() < 1e-3);
    assert!(out.contains(5.0, 5.0));
}

#[test]
fn corner_rounding_a_square() {
    let mut path = Path::new();
    path.add_rect(&rect(0.0, 0.0, 100.0, 100.0), Direction::Cw, 0);

    let effect = CornerPathEffect::new(10.0).unwrap();
    let mut out = Path::new();
    let mut stroke_rec = StrokeRec::fill();
    assert!(effect.filter_path(&mut out, &path, &mut stroke_rec, None, &Matrix::identity()));

    let lines = out.verbs().iter().filter(|v| **v == Verb::Line).count();
    let cubics = out.verbs().iter().filter(|v| **v == Verb::Cubic).count();
    assert_eq!(lines + cubics, 8);
    assert_eq!(out.bounds(), rect(0.0, 0.0, 100.0, 100.0));

    // The original corner is no longer on the path.
    assert!(!out.contains(99.5, 0.5));
    assert!(out.contains(50.0, 50.0));
}

#[test]
fn stroke_then_round_corners() {
    // Chain the two filters: a stroked rectangle's outline, then rounded.
    let mut path = Path::new();
    path.add_rect(&rect(0.0, 0.0, 40.0, 40.0), Direction::Cw, 0);
    let outline = stroke_path(&path, &StrokeOptions::default().with_width(4.0));

    let effect = CornerPathEffect::new(1.0).unwrap();
    let mut rounded = Path::new();
    let mut stroke_rec = StrokeRec::fill();
    assert!(effect.filter_path(
        &mut rounded,
        &outline,
        &mut stroke_rec,
        None,
        &Matrix::identity()
    ));
    assert!(!rounded.is_empty());
    assert_eq!(rounded.bounds(), outline.bounds());
    // Both walls survived as contours.
    assert_eq!(
        rounded.verbs().iter().filter(|v| **v == Verb::Move).count(),
        2
    );
}

#[test]
fn fill_rule_toggles_round_trip() {
    let mut path = Path::new();
    path.set_fill_rule(FillRule::EvenOdd);
    path.toggle_inverse_fill_rule();
    assert_eq!(path.fill_rule(), FillRule::InverseEvenOdd);
    path.toggle_inverse_fill_rule();
    assert_eq!(path.fill_rule(), FillRule::EvenOdd);
}

#[test]
fn transformed_stroke_stays_consistent() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.line_to(point(100.0, 0.0));

    // Stroking the transformed path equals transforming a stroke of the
    // same width for a pure translation.
    let translated = path.transformed(&Matrix::translation(10.0, 20.0));
    let a = stroke_path(&translated, &StrokeOptions::default().with_width(6.0));
    let b = stroke_path(&path, &StrokeOptions::default().with_width(6.0))
        .transformed(&Matrix::translation(10.0, 20.0));
    assert_eq!(a.bounds(), b.bounds());
    assert!(a.contains(60.0, 22.0));
    assert!(b.contains(60.0, 22.0));
}

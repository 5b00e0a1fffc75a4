use approx::assert_relative_eq;
use field_blend::{
    error::BlendError,
    primitive::{DistanceFieldPrimitive, Ellipse, Ellipsoid, SampleGrid},
    types::{Point, Point2D, Vector},
};

fn ellipse() -> Ellipse {
    Ellipse::new(0., -0.35, 0.25, 0.6)
}

#[test]
fn center_has_zero_gradient() {
    let e = ellipse();
    let (value, gradient) = e.evaluate(&e.center);
    assert_eq!(value, 0.);
    assert_eq!(gradient, Vector::zeros());
}

#[test]
fn field_rises_from_boundary_and_saturates() {
    let e = ellipse();
    let at = |k: f32| e.evaluate(&Point2D::new(e.center.x + k * e.r1, e.center.y)).0;
    assert_relative_eq!(at(0.5), 0.);
    assert_relative_eq!(at(1.), 0.);
    assert_relative_eq!(at(1.5), 0.5, epsilon = 1e-6);
    assert_relative_eq!(at(2.), 1., epsilon = 1e-6);
    assert_relative_eq!(at(3.), 1.);

    // The second radius governs the Y axis.
    let (value, _) = e.evaluate(&Point2D::new(e.center.x, e.center.y + 1.5 * e.r2));
    assert_relative_eq!(value, 0.5, epsilon = 1e-6);
}

#[test]
fn gradient_on_boundary() {
    let e = ellipse();
    let (_, gradient) = e.evaluate(&Point2D::new(e.center.x + e.r1, e.center.y));
    assert_relative_eq!(gradient.x, 1. / e.r1, epsilon = 1e-5);
    assert_relative_eq!(gradient.y, 0.);
    assert_relative_eq!(gradient.z, 0.);

    let (_, gradient) = e.evaluate(&Point2D::new(e.center.x, e.center.y - e.r2));
    assert_relative_eq!(gradient.y, -1. / e.r2, epsilon = 1e-5);
}

#[test]
fn batch_evaluation_keeps_order() {
    let e = ellipse();
    let queries = [
        Point2D::new(0.5, 0.),
        Point2D::new(0., -0.35),
        Point2D::new(-0.3, 0.2),
    ];
    let (values, gradients) = e.distance_and_gradient(&queries);
    assert_eq!(values.len(), 3);
    assert_eq!(gradients.len(), 3);
    for (i, q) in queries.iter().enumerate() {
        let (v, g) = e.evaluate(q);
        assert_eq!(values[i], v);
        assert_eq!(gradients[i], g);
    }

    let (values, gradients) = e.distance_and_gradient(&[]);
    assert!(values.is_empty() && gradients.is_empty());
}

#[test]
fn rejects_degenerate_radii() {
    let grid = SampleGrid::new(4);
    for (r1, r2) in [(0., 0.6), (0.25, -1.), (f32::NAN, 0.6), (0.25, f32::INFINITY)] {
        let e = Ellipse::new(0., 0., r1, r2);
        assert!(matches!(e.validate(), Err(BlendError::InvalidRadius { .. })));
        assert!(matches!(e.sample_grid(&grid), Err(BlendError::InvalidRadius { .. })));
        assert!(matches!(
            Ellipsoid::from_ellipse(&e).sample_volume(&grid),
            Err(BlendError::InvalidRadius { .. })
        ));
    }
    assert!(ellipse().validate().is_ok());
}

#[test]
fn preview_grid_is_indexed_y_then_x() {
    let e = ellipse();
    let grid = SampleGrid::new(5).with_bounds(-1., 1.);
    let field = e.sample_grid(&grid).unwrap();
    assert_eq!(field.shape(), &[5, 5]);

    let coords = grid.coords();
    for y in 0..5 {
        for x in 0..5 {
            let (v, g) = e.evaluate(&Point2D::new(coords[x], coords[y]));
            assert_eq!(field.values[[y, x]], v);
            assert_eq!(field.gradients[[y, x]], g);
        }
    }
}

#[test]
fn ellipsoid_matches_ellipse_in_its_plane() {
    let e = ellipse();
    let grid = SampleGrid::new(5).with_bounds(-1., 1.);
    let plane = e.sample_grid(&grid).unwrap();
    let volume = Ellipsoid::from_ellipse(&e).sample_volume(&grid).unwrap();
    assert_eq!(volume.shape(), &[5, 5, 5]);

    // coords[2] == 0.0, the plane the ellipse was lifted into.
    for y in 0..5 {
        for x in 0..5 {
            assert_relative_eq!(volume.values[[2, y, x]], plane.values[[y, x]], epsilon = 1e-6);
            assert_relative_eq!(volume.gradients[[2, y, x]], plane.gradients[[y, x]], epsilon = 1e-6);
        }
    }
}

#[test]
fn ellipsoid_uses_first_radius_along_z() {
    let s = Ellipsoid::new(0.1, 0.2, 0.3, 0.25, 0.6);
    let (value, gradient) = s.evaluate(&Point::new(0.1, 0.2, 0.3 + 1.5 * 0.25));
    assert_relative_eq!(value, 0.5, epsilon = 1e-6);
    assert_relative_eq!(gradient.z, 1. / 0.25, epsilon = 1e-5);
    assert_relative_eq!(gradient.x, 0.);
}

#[test]
fn volume_indexed_z_y_x() {
    let s = Ellipsoid::new(0.5, -0.5, 0., 0.3, 0.4);
    let grid = SampleGrid::new(4).with_bounds(-1., 1.);
    let volume = s.sample_volume(&grid).unwrap();
    let coords = grid.coords();
    for ((z, y, x), &v) in volume.values.indexed_iter() {
        let (expected, _) = s.evaluate(&Point::new(coords[x], coords[y], coords[z]));
        assert_eq!(v, expected);
    }
}

#[test]
fn rejects_unusable_grids() {
    let e = ellipse();
    assert!(matches!(
        e.sample_grid(&SampleGrid::new(1)),
        Err(BlendError::InvalidResolution(1))
    ));
    assert!(matches!(
        e.sample_grid(&SampleGrid::new(8).with_bounds(1., 1.)),
        Err(BlendError::InvalidDomain { .. })
    ));
    assert!(matches!(
        Ellipsoid::from_ellipse(&e).sample_volume(&SampleGrid::new(0)),
        Err(BlendError::InvalidResolution(0))
    ));
}

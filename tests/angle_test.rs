use approx::assert_abs_diff_eq;
use field_blend::{
    angle::{DEGENERATE_ANGLE, gradient_angle, gradient_angles},
    error::BlendError,
    types::Vector,
};
use ndarray::{Array2, Array3};

#[test]
fn identical_gradients_give_zero() {
    let g = Vector::new(1., 0., 0.);
    assert_eq!(gradient_angle(&g, &g), 0.);
}

#[test]
fn opposite_gradients_give_one() {
    let a = Vector::new(1., 0., 0.);
    let b = Vector::new(-1., 0., 0.);
    assert_abs_diff_eq!(gradient_angle(&a, &b), 1., epsilon = 1e-6);
}

#[test]
fn perpendicular_gradients_give_half() {
    let a = Vector::new(0., 2., 0.);
    let b = Vector::new(3., 0., 0.);
    assert_abs_diff_eq!(gradient_angle(&a, &b), 0.5, epsilon = 1e-6);
}

#[test]
fn zero_gradient_falls_back() {
    let a = Vector::zeros();
    let b = Vector::new(0.3, -0.2, 0.);
    assert_eq!(gradient_angle(&a, &b), DEGENERATE_ANGLE);
    assert_eq!(gradient_angle(&b, &a), DEGENERATE_ANGLE);
    assert_eq!(gradient_angle(&a, &a), DEGENERATE_ANGLE);
}

#[test]
fn scaled_parallel_gradients_never_nan() {
    let a = Vector::new(0.1, 0.2, 0.3);
    for scale in [1e-3, 0.7, 3., 1e4] {
        let angle = gradient_angle(&a, &(a * scale));
        assert!(angle.is_finite());
        assert!(angle < 1e-3, "angle {angle} at scale {scale}");

        let angle = gradient_angle(&a, &(a * -scale));
        assert!(angle.is_finite());
        assert!(angle > 1. - 1e-3, "angle {angle} at scale {scale}");
    }
}

#[test]
fn extreme_gradients_stay_in_range() {
    let huge = Vector::new(1e30, 0., 0.);
    assert_abs_diff_eq!(gradient_angle(&huge, &huge), 0., epsilon = 1e-6);
    assert_abs_diff_eq!(gradient_angle(&huge, &-huge), 1., epsilon = 1e-6);

    let tiny = Vector::new(0., 1e-30, 0.);
    assert_abs_diff_eq!(gradient_angle(&tiny, &huge), 0.5, epsilon = 1e-6);

    let inf = Vector::new(f32::INFINITY, 0., 0.);
    let nan = Vector::new(f32::NAN, 1., 0.);
    assert_eq!(gradient_angle(&inf, &huge), DEGENERATE_ANGLE);
    assert_eq!(gradient_angle(&nan, &huge), DEGENERATE_ANGLE);
}

#[test]
fn angles_over_grids() {
    let a = Array2::from_elem((2, 3), Vector::new(1., 0., 0.));
    let mut b = a.clone();
    b[[0, 1]] = Vector::new(-1., 0., 0.);
    b[[1, 2]] = Vector::zeros();

    let angles = gradient_angles(&a, &b).unwrap();
    assert_eq!(angles.shape(), &[2, 3]);
    assert_abs_diff_eq!(angles[[0, 1]], 1., epsilon = 1e-6);
    assert_eq!(angles[[1, 2]], DEGENERATE_ANGLE);
    assert_eq!(angles[[0, 0]], 0.);

    let volume = Array3::from_elem((2, 2, 2), Vector::new(0., 0., 1.));
    let angles = gradient_angles(&volume, &volume).unwrap();
    assert!(angles.iter().all(|&v| v == 0.));
}

#[test]
fn mismatched_gradient_grids_fail() {
    let a = Array2::from_elem((2, 3), Vector::new(1., 0., 0.));
    let b = Array2::from_elem((3, 2), Vector::new(1., 0., 0.));
    assert!(matches!(
        gradient_angles(&a, &b),
        Err(BlendError::ShapeMismatch { .. })
    ));
}

use std::f32::consts::PI;

use crate::{
    interp::linspace,
    primitive::Ellipse,
    types::{Point2D, Value},
};

/// `n` evenly spaced points from `start` to `end`, both inclusive.
pub fn line(start: Point2D, end: Point2D, n: usize) -> Vec<Point2D> {
    let xs = linspace(n, start.x, end.x);
    let ys = linspace(n, start.y, end.y);
    xs.into_iter()
        .zip(ys)
        .map(|(x, y)| Point2D::new(x, y))
        .collect()
}

/// `n` points on a circular arc around `center`, angles evenly spaced from `start_angle`
/// to `end_angle` (radians, both inclusive).
pub fn arc(center: Point2D, radius: Value, start_angle: Value, end_angle: Value, n: usize) -> Vec<Point2D> {
    linspace(n, start_angle, end_angle)
        .into_iter()
        .map(|a| Point2D::new(center.x + radius * a.cos(), center.y + radius * a.sin()))
        .collect()
}

/// Default sketch for a template: `n` points running from the left edge of `second`
/// to the left edge of `first`, then `n` points along the lower half of `first`
/// (radius `r1`, angles `π..2π`).
pub fn template_samples(first: &Ellipse, second: &Ellipse, n: usize) -> Vec<Point2D> {
    let start = Point2D::new(second.center.x - second.r1, second.center.y);
    let end = Point2D::new(first.center.x - first.r1, first.center.y);

    let mut samples = line(start, end, n);
    samples.extend(arc(first.center, first.r1, PI, 2. * PI, n));
    samples
}

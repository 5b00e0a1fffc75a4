use nalgebra::{Point2, Point3, Vector3};

/// Scalar field value at a point in space.
pub type Value = f32;

/// A 2D sample or query point.
pub type Point2D = Point2<Value>;

/// A 3D query point, or a mapped `(field1, field2, angle)` sample.
pub type Point = Point3<Value>;

/// A gradient vector. 2D primitives leave `z` at zero.
pub type Vector = Vector3<Value>;

use ndarray::{Array, Array2, Array3, Dimension, Ix2, Ix3};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    error::{BlendError, Result},
    interp::linspace,
    types::{Point, Point2D, Value, Vector},
};

/// A regular sampling lattice with `resolution` samples per axis spanning `[min, max]`.
///
/// Used both for the 2D preview grid (`S × S`) and the 3D synthesis volume (`S × S × S`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    /// Samples per axis.
    pub resolution: usize,
    /// Coordinate of the first sample on every axis.
    pub min: Value,
    /// Coordinate of the last sample on every axis.
    pub max: Value,
}

impl Default for SampleGrid {
    fn default() -> Self {
        Self {
            resolution: 100,
            min: -1.2,
            max: 1.2,
        }
    }
}

impl SampleGrid {
    /// Creates a grid with `resolution` samples per axis over the default range.
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }

    /// Sets the sampled coordinate range.
    pub fn with_bounds(mut self, min: Value, max: Value) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Rejects grids that cannot be sampled: fewer than two samples or an empty range.
    pub fn validate(&self) -> Result<()> {
        if self.resolution < 2 {
            return Err(BlendError::InvalidResolution(self.resolution));
        }
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(BlendError::InvalidDomain {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Sample coordinates along one axis.
    pub fn coords(&self) -> Vec<Value> {
        linspace(self.resolution, self.min, self.max)
    }
}

/// Dense scalar field plus its gradient, one vector per cell.
///
/// 2D fields are indexed `[y][x]`, 3D fields `[z][y][x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField<D: Dimension> {
    pub values: Array<Value, D>,
    pub gradients: Array<Vector, D>,
}

impl<D: Dimension> DistanceField<D> {
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }
}

/// Something that can report a distance value and its gradient at a query point.
///
/// Implementations are pure: the result depends only on the primitive's parameters
/// and the query.
pub trait DistanceFieldPrimitive: Send + Sync {
    /// Point type the primitive is queried with.
    type Query: Sync;

    /// Distance value and gradient at one point. Defined everywhere.
    fn evaluate(&self, query: &Self::Query) -> (Value, Vector);

    /// Evaluates every query point, keeping input order.
    fn distance_and_gradient(&self, queries: &[Self::Query]) -> (Vec<Value>, Vec<Vector>) {
        queries.iter().map(|q| self.evaluate(q)).unzip()
    }
}

/// Field value for a normalized radial distance `q`: zero on and inside the boundary
/// (`q <= 1`), saturating at one when `q >= 2`.
#[inline]
fn falloff(q: Value) -> Value {
    (q - 1.).clamp(0., 1.)
}

fn check_radii(r1: Value, r2: Value) -> Result<()> {
    if !(r1.is_finite() && r2.is_finite() && r1 > 0. && r2 > 0.) {
        return Err(BlendError::InvalidRadius { r1, r2 });
    }
    Ok(())
}

/// Axis-aligned 2D ellipse with semi-axis `r1` along X and `r2` along Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Point2D,
    pub r1: Value,
    pub r2: Value,
}

impl Ellipse {
    pub fn new(cx: Value, cy: Value, r1: Value, r2: Value) -> Self {
        Self {
            center: Point2D::new(cx, cy),
            r1,
            r2,
        }
    }

    /// Rejects radii that are not finite and positive.
    pub fn validate(&self) -> Result<()> {
        check_radii(self.r1, self.r2)
    }

    /// Samples the field over `grid` as an `S × S` array indexed `[y][x]`.
    pub fn sample_grid(&self, grid: &SampleGrid) -> Result<DistanceField<Ix2>> {
        self.validate()?;
        grid.validate()?;
        let coords = grid.coords();
        let s = grid.resolution;
        let samples = Array2::from_shape_fn((s, s), |(y, x)| {
            self.evaluate(&Point2D::new(coords[x], coords[y]))
        });
        Ok(DistanceField {
            values: samples.map(|&(v, _)| v),
            gradients: samples.map(|&(_, g)| g),
        })
    }
}

impl DistanceFieldPrimitive for Ellipse {
    type Query = Point2D;

    fn evaluate(&self, query: &Point2D) -> (Value, Vector) {
        let d = *query - self.center;
        let (r1_sq, r2_sq) = (self.r1 * self.r1, self.r2 * self.r2);
        let q = (d.x * d.x / r1_sq + d.y * d.y / r2_sq).sqrt();
        if q == 0. {
            return (falloff(q), Vector::zeros());
        }
        (falloff(q), Vector::new(d.x / (r1_sq * q), d.y / (r2_sq * q), 0.))
    }
}

/// Axis-aligned ellipsoid with semi-axis `r1` along X and Z and `r2` along Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub center: Point,
    pub r1: Value,
    pub r2: Value,
}

impl Ellipsoid {
    pub fn new(cx: Value, cy: Value, cz: Value, r1: Value, r2: Value) -> Self {
        Self {
            center: Point::new(cx, cy, cz),
            r1,
            r2,
        }
    }

    /// Lifts a 2D ellipse into the `z = 0` plane, keeping both radii.
    pub fn from_ellipse(ellipse: &Ellipse) -> Self {
        Self::new(ellipse.center.x, ellipse.center.y, 0., ellipse.r1, ellipse.r2)
    }

    /// Samples the field over `grid` as an `S × S × S` array indexed `[z][y][x]`.
    ///
    /// Work is parallelised over Z slices using Rayon.
    pub fn sample_volume(&self, grid: &SampleGrid) -> Result<DistanceField<Ix3>> {
        check_radii(self.r1, self.r2)?;
        grid.validate()?;
        let coords = grid.coords();
        let s = grid.resolution;

        let per_z: Vec<Vec<(Value, Vector)>> = (0..s)
            .into_par_iter()
            .map(|z| {
                let mut local = Vec::with_capacity(s * s);
                for y in 0..s {
                    for x in 0..s {
                        local.push(self.evaluate(&Point::new(coords[x], coords[y], coords[z])));
                    }
                }
                local
            })
            .collect();

        let (values, gradients): (Vec<Value>, Vec<Vector>) = per_z.into_iter().flatten().unzip();
        Ok(DistanceField {
            values: Array3::from_shape_vec((s, s, s), values)?,
            gradients: Array3::from_shape_vec((s, s, s), gradients)?,
        })
    }
}

impl DistanceFieldPrimitive for Ellipsoid {
    type Query = Point;

    fn evaluate(&self, query: &Point) -> (Value, Vector) {
        let d = *query - self.center;
        let (r1_sq, r2_sq) = (self.r1 * self.r1, self.r2 * self.r2);
        let q = (d.x * d.x / r1_sq + d.y * d.y / r2_sq + d.z * d.z / r1_sq).sqrt();
        if q == 0. {
            return (falloff(q), Vector::zeros());
        }
        (
            falloff(q),
            Vector::new(d.x / (r1_sq * q), d.y / (r2_sq * q), d.z / (r1_sq * q)),
        )
    }
}

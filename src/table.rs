use ndarray::{Array3, ArrayView3};
use tracing::debug;

use crate::{
    error::{BlendError, Result},
    interp::{bracket, trilinear},
    registration::Registration,
    types::{Point, Value},
};

/// Precomputed blend transfer function over `[0, 1]³`.
///
/// Stores an `R × R × R` grid indexed `[field1][field2][angle]`, with node `i` of every
/// axis sitting at `coord(i) = i / (R - 1)`. Values at nodes are exact; anything in
/// between is the trilinear blend of the 8 enclosing nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorTable {
    values: Array3<Value>,
}

impl OperatorTable {
    /// Wraps an existing grid.
    ///
    /// Returns [`BlendError::InvalidTableShape`] unless the grid is cubic, and
    /// [`BlendError::InvalidResolution`] if it has fewer than two nodes per axis.
    pub fn from_array(values: Array3<Value>) -> Result<Self> {
        let (r, ry, rz) = values.dim();
        if r != ry || r != rz {
            return Err(BlendError::InvalidTableShape(values.shape().to_vec()));
        }
        if r < 2 {
            return Err(BlendError::InvalidResolution(r));
        }
        Ok(Self { values })
    }

    /// Builds a table by evaluating `f(field1, field2, angle)` at every node.
    pub fn from_fn<F>(resolution: usize, f: F) -> Result<Self>
    where
        F: Fn(Value, Value, Value) -> Value,
    {
        if resolution < 2 {
            return Err(BlendError::InvalidResolution(resolution));
        }
        let step = 1. / (resolution - 1) as Value;
        let values = Array3::from_shape_fn((resolution, resolution, resolution), |(i, j, k)| {
            f(i as Value * step, j as Value * step, k as Value * step)
        });
        Ok(Self { values })
    }

    /// Nodes per axis.
    pub fn resolution(&self) -> usize {
        self.values.dim().0
    }

    /// Domain coordinate of node `i`.
    pub fn coord(&self, i: usize) -> Value {
        i as Value / (self.resolution() - 1) as Value
    }

    /// Stored value at node `(i, j, k)`.
    ///
    /// # Panics
    /// Panics if any index is `>= resolution`.
    pub fn node(&self, i: usize, j: usize, k: usize) -> Value {
        self.values[[i, j, k]]
    }

    pub fn values(&self) -> ArrayView3<'_, Value> {
        self.values.view()
    }

    /// Trilinear lookup at `(field1, field2, angle)`.
    ///
    /// Each coordinate is clamped into `[0, 1]` before the bracket search, so the
    /// lookup is defined for every input.
    pub fn sample(&self, x: Value, y: Value, z: Value) -> Value {
        let r = self.resolution();
        let (i, xd) = bracket(x, r);
        let (j, yd) = bracket(y, r);
        let (k, zd) = bracket(z, r);

        let mut corners = [[[0.; 2]; 2]; 2];
        for (dx, plane) in corners.iter_mut().enumerate() {
            for (dy, row) in plane.iter_mut().enumerate() {
                for (dz, corner) in row.iter_mut().enumerate() {
                    *corner = self.values[[i + dx, j + dy, k + dz]];
                }
            }
        }

        trilinear(&corners, xd, yd, zd)
    }

    /// [`sample`](OperatorTable::sample) at a mapped `(field1, field2, angle)` point.
    pub fn sample_point(&self, p: &Point) -> Value {
        self.sample(p.x, p.y, p.z)
    }
}

/// Produces the operator table for a session.
///
/// The generator sees the current registration, if any, and may use the registered
/// samples to shape its output.
pub trait OperatorGenerator: Send + Sync {
    fn generate(&self, resolution: usize, registration: Option<&Registration>) -> Result<OperatorTable>;
}

/// Clean union: `min(field1, field2)`, independent of the angle.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionOperator;

impl OperatorGenerator for UnionOperator {
    fn generate(&self, resolution: usize, _registration: Option<&Registration>) -> Result<OperatorTable> {
        debug!(resolution, "generating union operator");
        OperatorTable::from_fn(resolution, |x, y, _| x.min(y))
    }
}

/// Smooth union whose blend radius shrinks as the gradients diverge.
///
/// ```text
/// k = radius * (1 - angle)
/// h = max(k - |f1 - f2|, 0) / k
/// G = clamp(min(f1, f2) - h² k / 4, 0, 1)
/// ```
///
/// Parallel gradients (`angle = 0`) get the full radius; opposite gradients
/// (`angle = 1`) fall back to the clean union.
#[derive(Debug, Clone, Copy)]
pub struct SmoothUnionOperator {
    pub radius: Value,
}

impl Default for SmoothUnionOperator {
    fn default() -> Self {
        Self { radius: 0.3 }
    }
}

impl SmoothUnionOperator {
    pub fn new(radius: Value) -> Self {
        Self { radius }
    }

    fn blend(&self, x: Value, y: Value, angle: Value) -> Value {
        let k = self.radius * (1. - angle);
        let sharp = x.min(y);
        if k <= 0. {
            return sharp;
        }
        let h = (k - (x - y).abs()).max(0.) / k;
        (sharp - h * h * k * 0.25).clamp(0., 1.)
    }
}

impl OperatorGenerator for SmoothUnionOperator {
    fn generate(&self, resolution: usize, _registration: Option<&Registration>) -> Result<OperatorTable> {
        debug!(resolution, radius = self.radius, "generating smooth union operator");
        OperatorTable::from_fn(resolution, |x, y, a| self.blend(x, y, a))
    }
}

/// Generator backed by a closure over `(field1, field2, angle)`.
pub struct FnOperator<F>(pub F);

impl<F> OperatorGenerator for FnOperator<F>
where
    F: Fn(Value, Value, Value) -> Value + Send + Sync,
{
    fn generate(&self, resolution: usize, _registration: Option<&Registration>) -> Result<OperatorTable> {
        OperatorTable::from_fn(resolution, &self.0)
    }
}

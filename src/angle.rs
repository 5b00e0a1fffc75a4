use std::f32::consts::PI;

use ndarray::{Array, Dimension, Zip};

use crate::{
    error::{BlendError, Result},
    types::{Value, Vector},
};

/// Angle reported when either gradient is zero or not finite.
pub const DEGENERATE_ANGLE: Value = 0.;

/// Normalized angle between two gradients: `acos(â · b̂) / π`, in `[0, 1]`.
///
/// `0` means parallel, `1` means opposite. The cosine is clamped to `[-1, 1]` before
/// `acos` so rounding never produces NaN. Returns [`DEGENERATE_ANGLE`] if either
/// gradient is the zero vector or has a non-finite component.
#[inline]
pub fn gradient_angle(a: &Vector, b: &Vector) -> Value {
    let (a, b) = (unit_scale(a), unit_scale(b));
    let mag = a.norm() * b.norm();
    if !(mag.is_finite() && mag > 0.) {
        return DEGENERATE_ANGLE;
    }
    let cos = a.dot(&b) / mag;
    if !cos.is_finite() {
        return DEGENERATE_ANGLE;
    }
    cos.clamp(-1., 1.).acos() / PI
}

/// Divides by the largest absolute component so norms of huge or tiny gradients
/// neither overflow nor underflow.
#[inline]
fn unit_scale(v: &Vector) -> Vector {
    let m = v.amax();
    if m.is_finite() && m > 0. { v.unscale(m) } else { *v }
}

/// Elementwise [`gradient_angle`] over two gradient grids of the same shape.
pub fn gradient_angles<D: Dimension>(
    a: &Array<Vector, D>,
    b: &Array<Vector, D>,
) -> Result<Array<Value, D>> {
    BlendError::check_shape(a.shape(), b.shape())?;
    Ok(Zip::from(a.view())
        .and(b.view())
        .par_map_collect(|ga, gb| gradient_angle(ga, gb)))
}

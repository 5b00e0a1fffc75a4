use ndarray::{Array, Dimension, Zip};

use crate::{
    error::{BlendError, Result},
    table::OperatorTable,
    types::{Point, Value},
};

/// Blends two distance fields through `table`, cell by cell.
///
/// All three inputs must share one shape; the output has that shape too. Works the same
/// for the 2D preview grid and the 3D volume.
///
/// ```text
/// Per cell:
/// 1. (x, y, z) = (field1, field2, angle), each clamped into [0, 1]
/// 2. bracket    →  idx = clamp(floor(v * (R - 1)), 0, R - 2) per axis
/// 3. offsets    →  v * (R - 1) - idx
/// 4. 8 nodes    →  table[idx..=idx + 1] on every axis
/// 5. trilinear  →  blend X, then Y, then Z
/// ```
///
/// Cells are independent and evaluated in parallel with Rayon.
pub fn interpolate<D: Dimension>(
    field1: &Array<Value, D>,
    field2: &Array<Value, D>,
    angle: &Array<Value, D>,
    table: &OperatorTable,
) -> Result<Array<Value, D>> {
    BlendError::check_shape(field1.shape(), field2.shape())?;
    BlendError::check_shape(field1.shape(), angle.shape())?;

    Ok(Zip::from(field1.view())
        .and(field2.view())
        .and(angle.view())
        .par_map_collect(|&x, &y, &z| table.sample(x, y, z)))
}

/// Looks up every mapped `(field1, field2, angle)` sample in `table`.
pub fn interpolate_points(points: &[Point], table: &OperatorTable) -> Vec<Value> {
    points.iter().map(|p| table.sample_point(p)).collect()
}

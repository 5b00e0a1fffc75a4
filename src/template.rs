use ndarray::{Array2, Array3, Ix2, Ix3};

use crate::{
    angle::gradient_angles,
    error::Result,
    primitive::{DistanceField, Ellipse, Ellipsoid, SampleGrid},
    registration::map_samples,
    types::{Point, Point2D, Value},
};

/// The pair of primitives defining the current blend configuration, with their
/// 2D preview fields sampled once at construction.
#[derive(Debug, Clone)]
pub struct Template {
    first: Ellipse,
    second: Ellipse,
    preview: [DistanceField<Ix2>; 2],
    preview_angle: Array2<Value>,
}

impl Template {
    pub fn new(first: Ellipse, second: Ellipse, preview_grid: &SampleGrid) -> Result<Self> {
        let preview = [first.sample_grid(preview_grid)?, second.sample_grid(preview_grid)?];
        let preview_angle = gradient_angles(&preview[0].gradients, &preview[1].gradients)?;
        Ok(Self {
            first,
            second,
            preview,
            preview_angle,
        })
    }

    pub fn first(&self) -> &Ellipse {
        &self.first
    }

    pub fn second(&self) -> &Ellipse {
        &self.second
    }

    /// Preview fields of both primitives, indexed `[y][x]`.
    pub fn preview_fields(&self) -> &[DistanceField<Ix2>; 2] {
        &self.preview
    }

    /// Gradient angle between the two preview fields.
    pub fn preview_angle(&self) -> &Array2<Value> {
        &self.preview_angle
    }

    /// Maps raw samples into `(field1, field2, angle)` space against this template.
    pub fn map(&self, samples: &[Point2D]) -> Vec<Point> {
        map_samples(&self.first, &self.second, samples)
    }
}

/// Both primitives lifted to 3D and sampled over `grid`, plus their gradient angle.
#[derive(Debug, Clone)]
pub struct VolumeFields {
    pub first: DistanceField<Ix3>,
    pub second: DistanceField<Ix3>,
    pub angle: Array3<Value>,
}

impl VolumeFields {
    pub fn sample(first: &Ellipse, second: &Ellipse, grid: &SampleGrid) -> Result<Self> {
        let first = Ellipsoid::from_ellipse(first).sample_volume(grid)?;
        let second = Ellipsoid::from_ellipse(second).sample_volume(grid)?;
        let angle = gradient_angles(&first.gradients, &second.gradients)?;
        Ok(Self {
            first,
            second,
            angle,
        })
    }
}

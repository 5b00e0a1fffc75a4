use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, BlendError>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum BlendError {
    /// Interpolation inputs do not share one shape.
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// Grid or table resolution below 2.
    InvalidResolution(usize),
    /// Operator table array is not `R × R × R`.
    InvalidTableShape(Vec<usize>),
    /// Sampling range with `min >= max` or non-finite bounds.
    InvalidDomain { min: f32, max: f32 },
    /// Primitive radius that is zero, negative or non-finite.
    InvalidRadius { r1: f32, r2: f32 },
    /// No operator table has been generated yet.
    MissingOperatorTable,
    RegistrationFailed(String),
    /// A volume job was started before the last registration reset.
    StaleVolume { job: u64, session: u64 },
    #[from]
    Shape(ndarray::ShapeError),
}

impl std::error::Error for BlendError {}

impl BlendError {
    /// Fails with [`BlendError::ShapeMismatch`] unless both shapes are equal.
    pub(crate) fn check_shape(expected: &[usize], found: &[usize]) -> Result<()> {
        if expected != found {
            return Err(BlendError::ShapeMismatch {
                expected: expected.to_vec(),
                found: found.to_vec(),
            });
        }
        Ok(())
    }
}

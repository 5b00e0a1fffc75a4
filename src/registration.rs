use tracing::{debug, warn};

use crate::{
    angle::gradient_angle,
    error::{BlendError, Result},
    primitive::DistanceFieldPrimitive,
    types::{Point, Point2D, Value},
};

/// Samples whose first or second field value is at or below this are dropped by
/// [`RegistrationProcessor::preprocess`].
pub const NOISE_THRESHOLD: Value = 0.05;

/// Maps raw 2D samples into `(field1, field2, angle)` space.
///
/// Empty input gives empty output.
pub fn map_samples<P>(first: &P, second: &P, samples: &[Point2D]) -> Vec<Point>
where
    P: DistanceFieldPrimitive<Query = Point2D>,
{
    samples
        .iter()
        .map(|sample| {
            let (f1, g1) = first.evaluate(sample);
            let (f2, g2) = second.evaluate(sample);
            Point::new(f1, f2, gradient_angle(&g1, &g2))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationMode {
    Manual,
    Automatic,
}

/// Result of an automatic alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Reference point the samples were aligned to, in `(field1, field2, angle)` space.
    pub anchor: Point,
    /// Root-mean-square distance of the samples from `anchor`.
    pub residual: Value,
}

/// Registered sample set, consumed downstream by operator generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub mode: RegistrationMode,
    pub points: Vec<Point>,
    /// Present for automatic registrations only.
    pub alignment: Option<Alignment>,
}

/// Computes the alignment used by automatic registration.
///
/// Implementations report failure to align with [`BlendError::RegistrationFailed`].
pub trait RegistrationStrategy: Send + Sync {
    fn align(&self, points: &[Point]) -> Result<Alignment>;
}

/// Aligns samples to their centroid.
///
/// Fails on fewer than `min_points` samples or any non-finite coordinate.
#[derive(Debug, Clone, Copy)]
pub struct CentroidAlignment {
    pub min_points: usize,
}

impl Default for CentroidAlignment {
    fn default() -> Self {
        Self { min_points: 1 }
    }
}

impl RegistrationStrategy for CentroidAlignment {
    fn align(&self, points: &[Point]) -> Result<Alignment> {
        let required = self.min_points.max(1);
        if points.len() < required {
            return Err(BlendError::RegistrationFailed(format!(
                "need at least {required} samples, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(BlendError::RegistrationFailed(
                "samples contain non-finite coordinates".into(),
            ));
        }

        let n = points.len() as Value;
        let sum = points.iter().fold(Point::origin().coords, |acc, p| acc + p.coords);
        let anchor = Point::from(sum / n);
        let residual = (points
            .iter()
            .map(|p| (*p - anchor).norm_squared())
            .sum::<Value>()
            / n)
            .sqrt();

        Ok(Alignment { anchor, residual })
    }
}

/// Filters mapped samples and keeps the current registration.
pub struct RegistrationProcessor {
    threshold: Value,
    strategy: Box<dyn RegistrationStrategy>,
    current: Option<Registration>,
}

impl Default for RegistrationProcessor {
    fn default() -> Self {
        Self::new(CentroidAlignment::default())
    }
}

impl RegistrationProcessor {
    /// Creates a processor using `strategy` for automatic registration.
    pub fn new(strategy: impl RegistrationStrategy + 'static) -> Self {
        Self {
            threshold: NOISE_THRESHOLD,
            strategy: Box::new(strategy),
            current: None,
        }
    }

    /// Sets the noise threshold used by [`preprocess`](RegistrationProcessor::preprocess).
    pub fn with_threshold(mut self, threshold: Value) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> Value {
        self.threshold
    }

    /// See [`map_samples`].
    pub fn map<P>(&self, first: &P, second: &P, samples: &[Point2D]) -> Vec<Point>
    where
        P: DistanceFieldPrimitive<Query = Point2D>,
    {
        map_samples(first, second, samples)
    }

    /// Drops samples whose `field1` or `field2` is at or below the threshold.
    pub fn preprocess(&self, samples: &[Point]) -> Vec<Point> {
        samples
            .iter()
            .filter(|p| p.x > self.threshold && p.y > self.threshold)
            .copied()
            .collect()
    }

    /// Records `processed` as the current registration.
    ///
    /// An empty sample set is a failed registration and discards the previous one.
    pub fn register_points(&mut self, processed: &[Point]) -> Result<&Registration> {
        if processed.is_empty() {
            self.current = None;
            warn!("manual registration rejected: no samples");
            return Err(BlendError::RegistrationFailed("no samples to register".into()));
        }
        debug!(samples = processed.len(), "manual registration");
        Ok(&*self.current.insert(Registration {
            mode: RegistrationMode::Manual,
            points: processed.to_vec(),
            alignment: None,
        }))
    }

    /// Aligns `processed` with the configured [`RegistrationStrategy`] and records the result.
    ///
    /// On failure the previous registration is discarded.
    pub fn automatic_registration(&mut self, processed: &[Point]) -> Result<&Registration> {
        let alignment = match self.strategy.align(processed) {
            Ok(alignment) => alignment,
            Err(err) => {
                self.current = None;
                warn!(%err, "automatic registration failed");
                return Err(err);
            }
        };
        debug!(
            samples = processed.len(),
            residual = alignment.residual,
            "automatic registration"
        );
        Ok(&*self.current.insert(Registration {
            mode: RegistrationMode::Automatic,
            points: processed.to_vec(),
            alignment: Some(alignment),
        }))
    }

    pub fn current(&self) -> Option<&Registration> {
        self.current.as_ref()
    }

    /// Clears the current registration.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

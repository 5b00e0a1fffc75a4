use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use ndarray::{Array2, Array3};
use tracing::{debug, info, warn};

use crate::{
    error::{BlendError, Result},
    primitive::{Ellipse, SampleGrid},
    registration::{Registration, RegistrationProcessor, RegistrationStrategy},
    table::{OperatorGenerator, OperatorTable, SmoothUnionOperator},
    template::{Template, VolumeFields},
    types::{Point, Point2D, Value},
    volume::interpolate,
};

/// Session configuration for a [`Pipeline`].
///
/// ```rust,ignore
/// let config = PipelineConfig::default()
///     .with_table_resolution(32)
///     .with_volume_resolution(64);
/// let mut pipeline = Pipeline::new(config)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// First primitive of the template.
    pub first: Ellipse,
    /// Second primitive of the template.
    pub second: Ellipse,
    /// Operator table nodes per axis (`R`). Default: `50`.
    pub table_resolution: usize,
    /// Grid for the interactive 2D preview. Default: `100 × 100` over `[-1.2, 1.2]`.
    pub preview_grid: SampleGrid,
    /// Grid for the synthesized volume. Default: `100³` over `[-1.2, 1.2]`.
    pub volume_grid: SampleGrid,
    /// Samples with `field1` or `field2` at or below this are dropped before registration.
    /// Default: `0.05`.
    pub noise_threshold: Value,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            first: Ellipse::new(0., -0.35, 0.25, 0.6),
            second: Ellipse::new(0., 0.35, 0.25, 0.6),
            table_resolution: 50,
            preview_grid: SampleGrid::default(),
            volume_grid: SampleGrid::default(),
            noise_threshold: crate::registration::NOISE_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    pub fn with_primitives(mut self, first: Ellipse, second: Ellipse) -> Self {
        self.first = first;
        self.second = second;
        self
    }

    pub fn with_table_resolution(mut self, resolution: usize) -> Self {
        self.table_resolution = resolution;
        self
    }

    pub fn with_preview_resolution(mut self, resolution: usize) -> Self {
        self.preview_grid.resolution = resolution;
        self
    }

    pub fn with_volume_resolution(mut self, resolution: usize) -> Self {
        self.volume_grid.resolution = resolution;
        self
    }

    /// Sets the sampled coordinate range of both the preview and the volume grid.
    pub fn with_domain(mut self, min: Value, max: Value) -> Self {
        self.preview_grid = self.preview_grid.with_bounds(min, max);
        self.volume_grid = self.volume_grid.with_bounds(min, max);
        self
    }

    pub fn with_noise_threshold(mut self, threshold: Value) -> Self {
        self.noise_threshold = threshold;
        self
    }

    fn validate(&self) -> Result<()> {
        self.first.validate()?;
        self.second.validate()?;
        if self.table_resolution < 2 {
            return Err(BlendError::InvalidResolution(self.table_resolution));
        }
        self.preview_grid.validate()?;
        self.volume_grid.validate()
    }
}

/// Where a [`Pipeline`] is in its session.
///
/// ```text
/// Constructed ─map→ Mapped ─register→ Registered ─generate→ Generated
///      ↑                                                        │
///      └─────────────────── reset_registration ─────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Constructed,
    Mapped,
    Registered,
    Generated,
}

/// Output of one volume generation.
#[derive(Debug, Clone)]
pub struct GeneratedVolume {
    /// Operator table the volume was blended with.
    pub table: Arc<OperatorTable>,
    /// Gradient angle between the two primitives, indexed `[z][y][x]`.
    pub angle: Array3<Value>,
    /// Blended scalar field, indexed `[z][y][x]`.
    pub field: Array3<Value>,
    /// Wall time spent generating.
    pub elapsed: Duration,
    /// Registration session the job was started in.
    pub session: u64,
}

/// Owned snapshot of everything volume generation needs.
///
/// Detached from the [`Pipeline`] so it can run on another thread; hand the result back
/// with [`Pipeline::commit`].
pub struct VolumeJob {
    first: Ellipse,
    second: Ellipse,
    grid: SampleGrid,
    table_resolution: usize,
    generator: Arc<dyn OperatorGenerator>,
    registration: Option<Registration>,
    session: u64,
}

impl VolumeJob {
    /// Generates the operator table, samples both primitives over the volume grid and
    /// blends them.
    pub fn run(self) -> Result<GeneratedVolume> {
        let start = Instant::now();

        let table = self
            .generator
            .generate(self.table_resolution, self.registration.as_ref())?;
        debug!(resolution = table.resolution(), "operator table ready");

        let fields = VolumeFields::sample(&self.first, &self.second, &self.grid)?;
        let field = interpolate(
            &fields.first.values,
            &fields.second.values,
            &fields.angle,
            &table,
        )?;

        let elapsed = start.elapsed();
        info!(
            resolution = self.grid.resolution,
            elapsed_ms = elapsed.as_millis() as u64,
            "volume generated"
        );

        Ok(GeneratedVolume {
            table: Arc::new(table),
            angle: fields.angle,
            field,
            elapsed,
            session: self.session,
        })
    }
}

/// Drives one blending session: map samples, register them, generate the operator
/// table and synthesize the blended volume.
///
/// The operator table survives [`reset_registration`](Pipeline::reset_registration);
/// only [`generate`](Pipeline::generate) replaces it.
pub struct Pipeline {
    config: PipelineConfig,
    template: Template,
    registration: RegistrationProcessor,
    generator: Arc<dyn OperatorGenerator>,
    table: Option<Arc<OperatorTable>>,
    user_points: Vec<Point>,
    output: Option<Arc<GeneratedVolume>>,
    state: PipelineState,
    /// Bumped by every registration reset.
    session: u64,
}

impl Pipeline {
    /// Builds the template from `config`, using [`SmoothUnionOperator`] for table
    /// generation and centroid alignment for automatic registration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let template = Template::new(config.first, config.second, &config.preview_grid)?;
        let registration = RegistrationProcessor::default().with_threshold(config.noise_threshold);
        Ok(Self {
            config,
            template,
            registration,
            generator: Arc::new(SmoothUnionOperator::default()),
            table: None,
            user_points: Vec::new(),
            output: None,
            state: PipelineState::Constructed,
            session: 0,
        })
    }

    /// Replaces the operator generator used by [`generate`](Pipeline::generate).
    pub fn with_generator(mut self, generator: impl OperatorGenerator + 'static) -> Self {
        self.generator = Arc::new(generator);
        self
    }

    /// Replaces the strategy used by automatic registration.
    pub fn with_registration_strategy(mut self, strategy: impl RegistrationStrategy + 'static) -> Self {
        self.registration =
            RegistrationProcessor::new(strategy).with_threshold(self.config.noise_threshold);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Mapped samples from the last [`map`](Pipeline::map).
    pub fn user_points(&self) -> &[Point] {
        &self.user_points
    }

    pub fn registration(&self) -> Option<&Registration> {
        self.registration.current()
    }

    /// Most recently generated operator table.
    pub fn table(&self) -> Option<&Arc<OperatorTable>> {
        self.table.as_ref()
    }

    pub fn output(&self) -> Option<&Arc<GeneratedVolume>> {
        self.output.as_ref()
    }

    /// Maps raw samples into `(field1, field2, angle)` space and keeps them as the
    /// current user points.
    pub fn map(&mut self, samples: &[Point2D]) -> &[Point] {
        self.user_points = self.registration.map(self.template.first(), self.template.second(), samples);
        self.state = PipelineState::Mapped;
        debug!(samples = samples.len(), "samples mapped");
        &self.user_points
    }

    /// Current user points with noisy samples removed.
    pub fn processed_points(&self) -> Vec<Point> {
        self.registration.preprocess(&self.user_points)
    }

    /// Registers the processed user points as given.
    pub fn register_points(&mut self) -> Result<()> {
        let processed = self.processed_points();
        let outcome = self.registration.register_points(&processed).map(|_| ());
        self.after_registration(outcome)
    }

    /// Registers the processed user points through the registration strategy.
    pub fn automatic_registration(&mut self) -> Result<()> {
        let processed = self.processed_points();
        let outcome = self.registration.automatic_registration(&processed).map(|_| ());
        self.after_registration(outcome)
    }

    fn after_registration(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => self.state = PipelineState::Registered,
            Err(err) => {
                if self.state != PipelineState::Constructed {
                    self.state = PipelineState::Mapped;
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Snapshot for running volume generation off the pipeline.
    pub fn volume_job(&self) -> VolumeJob {
        VolumeJob {
            first: *self.template.first(),
            second: *self.template.second(),
            grid: self.config.volume_grid,
            table_resolution: self.config.table_resolution,
            generator: Arc::clone(&self.generator),
            registration: self.registration.current().cloned(),
            session: self.session,
        }
    }

    /// Stores the result of a [`VolumeJob`] as the current table and output.
    ///
    /// Volumes from a job started before the last
    /// [`reset_registration`](Pipeline::reset_registration) are rejected with
    /// [`BlendError::StaleVolume`] and leave the pipeline untouched.
    pub fn commit(&mut self, generated: GeneratedVolume) -> Result<Arc<GeneratedVolume>> {
        if generated.session != self.session {
            return Err(BlendError::StaleVolume {
                job: generated.session,
                session: self.session,
            });
        }
        let generated = Arc::new(generated);
        self.table = Some(Arc::clone(&generated.table));
        self.output = Some(Arc::clone(&generated));
        self.state = PipelineState::Generated;
        Ok(generated)
    }

    /// Regenerates the operator table and the blended volume.
    pub fn generate(&mut self) -> Result<Arc<GeneratedVolume>> {
        let generated = self.volume_job().run()?;
        self.commit(generated)
    }

    /// Blends the template's 2D preview fields with the current operator table.
    ///
    /// Returns [`BlendError::MissingOperatorTable`] before the first
    /// [`generate`](Pipeline::generate).
    pub fn preview(&self) -> Result<Array2<Value>> {
        let table = self.table.as_ref().ok_or(BlendError::MissingOperatorTable)?;
        let [first, second] = self.template.preview_fields();
        interpolate(&first.values, &second.values, self.template.preview_angle(), table)
    }

    /// Runs map → preprocess → automatic registration → generate.
    ///
    /// Stops at the first failure; a failed registration leaves the pipeline in
    /// [`PipelineState::Mapped`].
    pub fn automate(&mut self, samples: &[Point2D]) -> Result<Arc<GeneratedVolume>> {
        let start = Instant::now();
        self.map(samples);
        if let Err(err) = self.automatic_registration() {
            warn!(%err, "automate stopped before generation");
            return Err(err);
        }
        let generated = self.generate()?;
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "automate finished");
        Ok(generated)
    }

    /// Returns to [`PipelineState::Constructed`]: rebuilds the template from the
    /// configuration and clears user points, registration and output.
    ///
    /// The operator table is kept.
    pub fn reset_registration(&mut self) -> Result<()> {
        self.template = Template::new(self.config.first, self.config.second, &self.config.preview_grid)?;
        self.user_points = Vec::new();
        self.registration.reset();
        self.output = None;
        self.state = PipelineState::Constructed;
        self.session += 1;
        debug!(session = self.session, "registration reset");
        Ok(())
    }
}

pub mod angle;
pub mod error;
pub mod interp;
pub mod pipeline;
#[cfg(feature = "plugin")]
pub mod plugin;
pub mod primitive;
pub mod registration;
pub mod sampling;
pub mod table;
pub mod template;
pub mod types;
pub mod volume;

pub use pipeline::{Pipeline, PipelineConfig};
#[cfg(feature = "plugin")]
pub use plugin::BlendFieldPlugin;

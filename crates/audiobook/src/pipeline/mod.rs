//! Conversion of one stored document into an audio artifact.

pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod runner;

pub use config::{PipelineConfig, MAX_SYNTHESIS_CHARS};
pub use context::PipelineContext;
pub use error::PipelineError;
pub use progress::{ProgressEvent, ProgressReporter, StoreProgress};
pub use runner::Pipeline;

pub mod broadcast;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod storage;
pub mod synthesis;
pub mod worker;

pub use broadcast::{JobId, JobProgressBroadcaster, JobProgressEvent, JobStatus, JobStore};
pub use config::{load_config_from_env, load_config_from_lookup, Config};
pub use controller::{Artifact, JobController, JobStatusView, JobSummary};
pub use error::{
    ArtifactError, AudiobookError, ConfigError, JobStoreError, ProcessError, Result, StorageError,
    SubmitError, SynthesisError, ValidationError, WorkerError,
};
pub use pipeline::{Pipeline, PipelineConfig, PipelineContext};
pub use processor::{PdfTextExtractor, TextExtractor};
pub use synthesis::{GoogleTranslateTts, SpeechSynthesizer};

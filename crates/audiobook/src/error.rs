use std::path::PathBuf;
use thiserror::Error;

use crate::broadcast::job_progress::JobStatus;

#[derive(Error, Debug)]
pub enum AudiobookError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),
}

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Speech service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Speech service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to write audio '{path}': {source}")]
    WriteAudio {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Nothing to synthesize")]
    EmptyText,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobStoreError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

/// Rejection of an upload before any job is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file selected")]
    MissingFilename,

    #[error("Unsupported file type '{0}': please upload a PDF file")]
    UnsupportedExtension(String),

    #[error("File is {size} bytes, larger than the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] StorageError),

    #[error("Conversion queue unavailable: {0}")]
    Worker(#[from] WorkerError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Audio for job {0} is not ready")]
    NotReady(String),
}

impl From<JobStoreError> for ArtifactError {
    fn from(err: JobStoreError) -> Self {
        match err {
            JobStoreError::NotFound(id) => ArtifactError::NotFound(id),
            JobStoreError::InvalidTransition { job_id, .. } => ArtifactError::NotReady(job_id),
        }
    }
}

pub type Result<T> = std::result::Result<T, AudiobookError>;

//! Boundary operations: submit, poll, download, list.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::broadcast::{
    JobId, JobProgressBroadcaster, JobProgressEvent, JobStatus, JobStore, StoredJob,
};
use crate::config::Config;
use crate::error::{
    ArtifactError, JobStoreError, SubmitError, ValidationError, WorkerError,
};
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::processor::{self, TextExtractor};
use crate::sanitize;
use crate::storage::{download_name, FileStorage};
use crate::synthesis::SpeechSynthesizer;
use crate::worker::{Job, WorkerPool};

/// Format of [`JobSummary::created_at_display`].
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What a polling client sees for one job.
///
/// Keys are snake_case on the wire (`error_message`), unlike the listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JobStatusView {
    pub status: JobStatus,
    pub progress: u8,
    pub completed: bool,
    pub failed: bool,
    pub error_message: Option<String>,
}

impl From<&StoredJob> for JobStatusView {
    fn from(job: &StoredJob) -> Self {
        Self {
            status: job.status,
            progress: job.progress,
            completed: job.status == JobStatus::Completed,
            failed: job.status == JobStatus::Failed,
            error_message: job.error.clone(),
        }
    }
}

/// One row of the job listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job_id: JobId,
    pub filename: String,
    pub status: JobStatus,
    pub progress: u8,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `created_at` in server local time.
    pub created_at_display: String,
}

impl From<&StoredJob> for JobSummary {
    fn from(job: &StoredJob) -> Self {
        Self {
            job_id: job.job_id.clone(),
            filename: job.filename.clone(),
            status: job.status,
            progress: job.progress,
            error: job.error.clone(),
            created_at: job.created_at,
            created_at_display: job
                .created_at
                .with_timezone(&Local)
                .format(CREATED_AT_FORMAT)
                .to_string(),
        }
    }
}

/// A finished audio file ready to be streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// Suggested name for the client: `<stem>.mp3`.
    pub download_name: String,
}

pub struct JobController {
    store: Arc<JobStore>,
    broadcaster: JobProgressBroadcaster,
    storage: FileStorage,
    pool: WorkerPool,
    max_file_size: u64,
}

impl JobController {
    /// Creates the storage directories and starts the worker pool.
    pub fn new(
        config: &Config,
        extractor: Arc<dyn TextExtractor>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> crate::error::Result<Self> {
        config.ensure_directories()?;
        let storage = config.storage();

        let broadcaster = JobProgressBroadcaster::default();
        let store = Arc::new(JobStore::with_broadcaster(broadcaster.clone()));

        let pipeline_config = Arc::new(PipelineConfig::from_config(config));
        let pipeline = Arc::new(Pipeline::new(pipeline_config, extractor, synthesizer));
        let pool = WorkerPool::new(pipeline, Arc::clone(&store), config.worker_count)?;

        Ok(Self {
            store,
            broadcaster,
            storage,
            pool,
            max_file_size: config.max_file_size,
        })
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Checks an upload without touching storage.
    pub fn validate_upload(&self, filename: &str, size: u64) -> Result<(), ValidationError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::MissingFilename);
        }
        if !processor::has_accepted_extension(filename.trim()) {
            return Err(ValidationError::UnsupportedExtension(
                sanitize::upload_basename(filename),
            ));
        }
        if size > self.max_file_size {
            return Err(ValidationError::TooLarge {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Validates and stores an upload, creates its job and queues the conversion.
    ///
    /// Returns as soon as the job is queued. A queue that closes after the job
    /// was created fails that job instead of leaving it pending.
    pub fn submit(&self, content: &[u8], filename: &str) -> Result<JobId, SubmitError> {
        self.validate_upload(filename, content.len() as u64)?;
        if self.pool.is_shutdown() {
            return Err(SubmitError::Worker(WorkerError::ChannelClosed));
        }

        let basename = sanitize::upload_basename(filename);
        let source_path = self.storage.store_upload(content, &basename)?;
        let job_id = self.store.create(&basename, &source_path);
        info!(job_id = %job_id, filename = %basename, "Accepted upload");

        if let Err(e) = self.pool.submit(Job::new(job_id.clone(), basename, source_path)) {
            warn!(job_id = %job_id, "Could not queue conversion: {}", e);
            self.fail_unqueued(&job_id, &e.to_string());
        }

        Ok(job_id)
    }

    fn fail_unqueued(&self, job_id: &str, error: &str) {
        let result = self
            .store
            .transition_to_processing(job_id)
            .and_then(|_| self.store.transition_to_failed(job_id, error));
        if let Err(e) = result {
            warn!(job_id = %job_id, "Could not mark unqueued job failed: {}", e);
        }
    }

    pub fn get_status(&self, job_id: &str) -> Result<JobStatusView, JobStoreError> {
        self.store.get(job_id).map(|job| JobStatusView::from(&job))
    }

    /// Resolves the audio of a completed job.
    pub fn get_artifact(&self, job_id: &str) -> Result<Artifact, ArtifactError> {
        let job = self.store.get(job_id)?;
        let path = match (job.status, job.audio_path.as_ref()) {
            (JobStatus::Completed, Some(path)) if path.is_file() => path.clone(),
            _ => return Err(ArtifactError::NotReady(job.job_id)),
        };

        Ok(Artifact {
            path,
            download_name: download_name(&job.filename_stem()),
        })
    }

    /// Every job, newest first.
    pub fn list_jobs(&self) -> Vec<JobSummary> {
        self.store.list_all().iter().map(JobSummary::from).collect()
    }

    /// Live stream of job snapshots, one per store mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.broadcaster.subscribe()
    }

    /// Jobs accepted but not yet picked up by a worker.
    pub fn queued_jobs(&self) -> usize {
        self.pool.queued()
    }

    /// `(active, completed, failed)` job counts.
    pub fn job_counts(&self) -> (usize, usize, usize) {
        self.store.counts()
    }

    /// Clients currently following the progress stream.
    pub fn stream_subscribers(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    /// Stops accepting uploads and waits for running conversions to finish.
    pub fn shutdown(&self) {
        self.pool.shutdown();
        self.pool.join();
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use log::warn;

use crate::broadcast::job_store::{JobId, JobStore};
use crate::error::JobStoreError;

/// Percentage reported once a job starts processing.
pub const PROGRESS_STARTED: u8 = 10;
/// Percentage reported once extraction has finished.
pub const PROGRESS_EXTRACTED: u8 = 50;

/// Events emitted by the pipeline during a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Processing,
    Progress(u8),
    Completed { audio_path: PathBuf },
    Failed { error: String },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Maps extraction of `done` out of `total` pages onto the 10..=50 band.
pub fn extraction_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return PROGRESS_EXTRACTED;
    }
    let span = usize::from(PROGRESS_EXTRACTED - PROGRESS_STARTED);
    let step = done.min(total) * span / total;
    // step <= span <= 40, so the cast cannot truncate
    PROGRESS_STARTED + step as u8
}

/// Writes pipeline events into the [`JobStore`] for one job.
///
/// Store errors (unknown id, rejected transition) are logged and dropped;
/// the pipeline never stops because of them.
pub struct StoreProgress {
    store: Arc<JobStore>,
    job_id: JobId,
}

impl StoreProgress {
    pub fn new(store: Arc<JobStore>, job_id: &str) -> Self {
        Self {
            store,
            job_id: job_id.to_string(),
        }
    }

    fn apply(&self, event: ProgressEvent) -> Result<(), JobStoreError> {
        match event {
            ProgressEvent::Processing => self.store.transition_to_processing(&self.job_id),
            ProgressEvent::Progress(percent) => self.store.set_progress(&self.job_id, percent),
            ProgressEvent::Completed { audio_path } => self
                .store
                .transition_to_completed(&self.job_id, &audio_path),
            ProgressEvent::Failed { error } => {
                self.store.transition_to_failed(&self.job_id, &error)
            }
        }
    }
}

impl ProgressReporter for StoreProgress {
    fn report(&self, event: ProgressEvent) {
        if let Err(e) = self.apply(event) {
            warn!("Dropped progress update for job {}: {}", self.job_id, e);
        }
    }
}

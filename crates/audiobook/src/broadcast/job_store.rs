//! In-memory job store shared by the controller and the pipeline workers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::broadcast::job_progress::{JobProgressBroadcaster, JobProgressEvent, JobStatus};
use crate::error::JobStoreError;

/// Opaque job identifier (UUID v4 string).
pub type JobId = String;

/// Highest progress a job can report before it is completed.
const MAX_RUNNING_PROGRESS: u8 = 99;

// ─── StoredJob ──────────────────────────────────────────────────────────────

/// Snapshot of a conversion job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredJob {
    /// Unique job identifier.
    pub job_id: JobId,
    /// Original filename of the uploaded document.
    pub filename: String,
    /// Where the upload was stored.
    pub source_path: PathBuf,
    /// Current status.
    pub status: JobStatus,
    /// Checkpoint progress in percent.
    pub progress: u8,
    /// Synthesized audio (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<PathBuf>,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// Creation order, breaks ties between equal timestamps.
    #[serde(skip)]
    sequence: u64,
}

impl StoredJob {
    fn new(job_id: JobId, filename: &str, source_path: &Path, sequence: u64) -> Self {
        Self {
            job_id,
            filename: filename.to_string(),
            source_path: source_path.to_path_buf(),
            status: JobStatus::Pending,
            progress: 0,
            audio_path: None,
            error: None,
            created_at: Utc::now(),
            sequence,
        }
    }

    /// Returns true if this job is finished (completed or failed).
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// File stem of the original upload, used to name the audio artifact.
    pub fn filename_stem(&self) -> String {
        crate::sanitize::filename_stem(&self.filename)
    }

    /// Snapshot of this job as a progress event.
    pub fn to_event(&self) -> JobProgressEvent {
        let event =
            JobProgressEvent::new(&self.job_id, &self.filename, self.status, self.progress);
        match self.error {
            Some(ref error) => event.with_error(error),
            None => event,
        }
    }

    fn ensure_status(&self, expected: JobStatus, to: JobStatus) -> Result<(), JobStoreError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(JobStoreError::InvalidTransition {
                job_id: self.job_id.clone(),
                from: self.status,
                to,
            })
        }
    }
}

// ─── JobStore ───────────────────────────────────────────────────────────────

/// Registry of every job created by this process.
///
/// Each mutation runs under the write lock, so readers only ever see whole
/// records. Records are never evicted.
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, StoredJob>>,
    next_sequence: AtomicU64,
    broadcaster: Option<JobProgressBroadcaster>,
}

impl JobStore {
    /// Creates an empty job store.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            next_sequence: AtomicU64::new(0),
            broadcaster: None,
        }
    }

    /// Creates a job store that publishes every mutation to `broadcaster`.
    pub fn with_broadcaster(broadcaster: JobProgressBroadcaster) -> Self {
        Self {
            broadcaster: Some(broadcaster),
            ..Self::new()
        }
    }

    fn read_jobs(&self) -> RwLockReadGuard<'_, HashMap<JobId, StoredJob>> {
        match self.jobs.read() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_jobs(&self) -> RwLockWriteGuard<'_, HashMap<JobId, StoredJob>> {
        match self.jobs.write() {
            Ok(g) => g,
            Err(poisoned) => {
                log::warn!("Job store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn publish(&self, job: &StoredJob) {
        if let Some(ref broadcaster) = self.broadcaster {
            broadcaster.send(job.to_event());
        }
    }

    /// Registers a new pending job and returns its id.
    pub fn create(&self, filename: &str, source_path: &Path) -> JobId {
        let job = {
            let mut jobs = self.write_jobs();
            // Allocated under the lock so sequence order matches created_at order
            let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
            let mut job_id = uuid::Uuid::new_v4().to_string();
            while jobs.contains_key(&job_id) {
                job_id = uuid::Uuid::new_v4().to_string();
            }
            let job = StoredJob::new(job_id.clone(), filename, source_path, sequence);
            jobs.insert(job_id, job.clone());
            job
        };

        tracing::debug!(job_id = %job.job_id, "Job created");
        self.publish(&job);
        job.job_id
    }

    /// Returns a snapshot of the job.
    pub fn get(&self, job_id: &str) -> Result<StoredJob, JobStoreError> {
        self.read_jobs()
            .get(job_id)
            .cloned()
            .ok_or_else(|| JobStoreError::NotFound(job_id.to_string()))
    }

    /// Applies `f` to the job under the write lock and publishes the result.
    /// The record is left untouched when `f` fails.
    fn mutate<F>(&self, job_id: &str, f: F) -> Result<StoredJob, JobStoreError>
    where
        F: FnOnce(&StoredJob) -> Result<StoredJob, JobStoreError>,
    {
        let updated = {
            let mut jobs = self.write_jobs();
            let job = jobs
                .get_mut(job_id)
                .ok_or_else(|| JobStoreError::NotFound(job_id.to_string()))?;
            let updated = f(job)?;
            *job = updated.clone();
            updated
        };

        self.publish(&updated);
        Ok(updated)
    }

    /// Raises the progress of a running job.
    ///
    /// Values are clamped to 0..=99 and never lower the current progress;
    /// 100 is reserved for [`JobStore::transition_to_completed`].
    pub fn set_progress(&self, job_id: &str, percent: u8) -> Result<(), JobStoreError> {
        self.mutate(job_id, |job| {
            if job.is_finished() {
                return Err(JobStoreError::InvalidTransition {
                    job_id: job.job_id.clone(),
                    from: job.status,
                    to: job.status,
                });
            }
            let mut updated = job.clone();
            updated.progress = job.progress.max(percent.min(MAX_RUNNING_PROGRESS));
            Ok(updated)
        })
        .map(|_| ())
    }

    /// `Pending -> Processing`.
    pub fn transition_to_processing(&self, job_id: &str) -> Result<(), JobStoreError> {
        self.mutate(job_id, |job| {
            job.ensure_status(JobStatus::Pending, JobStatus::Processing)?;
            let mut updated = job.clone();
            updated.status = JobStatus::Processing;
            Ok(updated)
        })
        .map(|_| ())
    }

    /// `Processing -> Completed`, recording the audio artifact and progress 100.
    pub fn transition_to_completed(
        &self,
        job_id: &str,
        audio_path: &Path,
    ) -> Result<(), JobStoreError> {
        self.mutate(job_id, |job| {
            job.ensure_status(JobStatus::Processing, JobStatus::Completed)?;
            let mut updated = job.clone();
            updated.status = JobStatus::Completed;
            updated.progress = 100;
            updated.audio_path = Some(audio_path.to_path_buf());
            Ok(updated)
        })
        .map(|_| ())
    }

    /// `Processing -> Failed`, recording the error. Progress stays where it was.
    pub fn transition_to_failed(&self, job_id: &str, error: &str) -> Result<(), JobStoreError> {
        self.mutate(job_id, |job| {
            job.ensure_status(JobStatus::Processing, JobStatus::Failed)?;
            let mut updated = job.clone();
            updated.status = JobStatus::Failed;
            updated.error = Some(error.to_string());
            Ok(updated)
        })
        .map(|_| ())
    }

    /// All jobs, newest first.
    pub fn list_all(&self) -> Vec<StoredJob> {
        let mut jobs: Vec<StoredJob> = self.read_jobs().values().cloned().collect();
        jobs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        jobs
    }

    /// Returns `(active, completed, failed)` counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        let jobs = self.read_jobs();
        let mut active = 0;
        let mut completed = 0;
        let mut failed = 0;
        for job in jobs.values() {
            match job.status {
                JobStatus::Pending | JobStatus::Processing => active += 1,
                JobStatus::Completed => completed += 1,
                JobStatus::Failed => failed += 1,
            }
        }
        (active, completed, failed)
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

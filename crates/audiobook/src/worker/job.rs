use std::path::PathBuf;

use crate::broadcast::job_store::JobId;

/// A conversion queued for a worker.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    /// Sanitized name the client uploaded the document under.
    pub filename: String,
    /// Stored copy of the upload.
    pub source_path: PathBuf,
}

impl Job {
    pub fn new(id: impl Into<JobId>, filename: impl Into<String>, source_path: PathBuf) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            source_path,
        }
    }

    /// Base name of the upload without its extension, used to name the audio.
    pub fn filename_stem(&self) -> String {
        crate::sanitize::filename_stem(&self.filename)
    }
}

#[derive(Debug)]
pub struct JobResult {
    pub job_id: JobId,
    pub success: bool,
    pub audio_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl JobResult {
    pub fn success(job: &Job, audio_path: PathBuf) -> Self {
        Self {
            job_id: job.id.clone(),
            success: true,
            audio_path: Some(audio_path),
            error: None,
        }
    }

    pub fn failure(job: &Job, error: String) -> Self {
        Self {
            job_id: job.id.clone(),
            success: false,
            audio_path: None,
            error: Some(error),
        }
    }
}

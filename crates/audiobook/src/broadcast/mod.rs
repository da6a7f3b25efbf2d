//! Job state shared between request handling and the pipeline workers.
//!
//! The store owns every job record; the broadcaster streams each change to
//! any interested subscriber (e.g. a server-sent-events endpoint).

pub mod job_progress;
pub mod job_store;

pub use job_progress::{JobProgressBroadcaster, JobProgressEvent, JobStatus};
pub use job_store::{JobId, JobStore, StoredJob};

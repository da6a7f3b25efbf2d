//! HTTP routes.
//!
//! - POST /upload: submit a PDF for conversion
//! - GET /api/job/{job_id}/progress: poll one job
//! - GET /download/{job_id}: fetch the finished audio
//! - GET /api/jobs: list every job, newest first
//! - GET /api/jobs/stream: SSE stream of job updates
//! - GET /api/health: liveness and queue depth

pub mod download;
pub mod health;
pub mod jobs;
pub mod upload;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(upload::router())
        .merge(download::router())
        .nest("/api", jobs::router().merge(health::router()))
        .with_state(state)
}

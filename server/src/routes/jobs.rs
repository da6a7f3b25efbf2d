use std::convert::Infallible;
use std::sync::Arc;

use audiobook::{JobProgressEvent, JobStatusView, JobSummary};
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::broadcast::error::RecvError;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/job/{job_id}/progress
async fn job_progress(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusView>> {
    Ok(Json(state.controller.get_status(&job_id)?))
}

/// GET /api/jobs
async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<JobSummary>> {
    Json(state.controller.list_jobs())
}

fn job_event(event: &JobProgressEvent) -> Event {
    Event::default()
        .event("job")
        .data(serde_json::to_string(event).unwrap_or_default())
}

/// GET /api/jobs/stream
async fn stream_jobs(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.controller.subscribe();

    let stream = async_stream::stream! {
        loop {
            let received = tokio::select! {
                received = rx.recv() => received,
                _ = state.shutdown.cancelled() => break,
            };
            match received {
                Ok(event) => yield Ok(job_event(&event)),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("SSE client lagged by {} events, re-sending all jobs", n);
                    for job in state.controller.store().list_all() {
                        yield Ok(job_event(&job.to_event()));
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/job/{job_id}/progress", get(job_progress))
        .route("/jobs", get(list_jobs))
        .route("/jobs/stream", get(stream_jobs))
}

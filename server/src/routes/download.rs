use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio_util::io::ReaderStream;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// `Content-Disposition` for `name`, with an ASCII fallback and an RFC 5987
/// `filename*` for non-ASCII names.
pub fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    )
}

/// GET /download/{job_id}
async fn download(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    let artifact = state.controller.get_artifact(&job_id)?;

    let file = tokio::fs::File::open(&artifact.path).await.map_err(|e| {
        tracing::warn!(job_id = %job_id, "Could not open audio: {}", e);
        ApiError::AudioNotAvailable(job_id.clone())
    })?;

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&artifact.download_name),
            ),
        ],
        body,
    )
        .into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/download/{job_id}", get(download))
}

use std::sync::Arc;

use audiobook::{JobId, ValidationError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub job_id: JobId,
}

/// POST /upload
async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        // Reject on the name alone before reading the body
        if filename.trim().is_empty() {
            return Err(ValidationError::MissingFilename.into());
        }
        state.controller.validate_upload(&filename, 0)?;

        let content = field.bytes().await?;
        tracing::info!("Received upload {} ({} bytes)", filename, content.len());

        let controller = Arc::clone(&state.controller);
        let job_id = tokio::task::spawn_blocking(move || controller.submit(&content, &filename))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))??;

        return Ok((StatusCode::CREATED, Json(UploadResponse { job_id })));
    }

    Err(ValidationError::MissingFilename.into())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/upload", post(upload))
}

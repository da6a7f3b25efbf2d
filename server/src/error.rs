use audiobook::{ArtifactError, JobStoreError, SubmitError, ValidationError};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Audio not available for job {0}")]
    AudioNotAvailable(String),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(e) => ApiError::Validation(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JobStoreError> for ApiError {
    fn from(err: JobStoreError) -> Self {
        match err {
            JobStoreError::NotFound(id) => ApiError::JobNotFound(id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ArtifactError> for ApiError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound(id) => ApiError::JobNotFound(id),
            ArtifactError::NotReady(id) => ApiError::AudioNotAvailable(id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string())),
            ApiError::JobNotFound(id) => {
                tracing::debug!(job_id = %id, "Job not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Job not found", format!("Job ID: {}", id)),
                )
            }
            ApiError::AudioNotAvailable(id) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::with_details("Audio not available", format!("Job ID: {}", id)),
            ),
            ApiError::Multipart(e) => (
                e.status(),
                ErrorResponse::with_details("Invalid upload", e.body_text()),
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Internal server error", msg.clone()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

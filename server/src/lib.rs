//! HTTP front end for the audiobook converter.
//!
//! A thin axum layer over [`audiobook::JobController`]: every route maps
//! one-to-one onto a controller operation.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::api_routes;
pub use state::AppState;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the file itself.
pub const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Create the application with all routes and middleware.
///
/// Request bodies are capped slightly above the controller's upload limit so
/// oversize files are normally reported as a validation error rather than a
/// dropped connection.
pub fn create_app(state: Arc<AppState>) -> Router {
    let limit = state
        .controller
        .max_file_size()
        .saturating_add(MULTIPART_OVERHEAD);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);

    api_routes(state)
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use audiobook::{
        Config, JobController, ProcessError, SpeechSynthesizer, SynthesisError, TextExtractor,
    };
    use axum::body::Body;
    use axum::http::{header, HeaderMap, Request, StatusCode};
    use serde_json::Value;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "audiobook-test-boundary";

    /// Treats the uploaded bytes as the document text.
    struct BytesAsText;

    impl TextExtractor for BytesAsText {
        fn extract(
            &self,
            path: &Path,
            on_page: &mut dyn FnMut(usize, usize),
        ) -> Result<String, ProcessError> {
            let text = std::fs::read_to_string(path).map_err(|source| {
                ProcessError::ReadDocument {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            on_page(1, 1);
            Ok(text)
        }
    }

    struct FakeSynthesizer;

    impl SpeechSynthesizer for FakeSynthesizer {
        fn synthesize(
            &self,
            text: &str,
            _language: &str,
            output: &Path,
        ) -> Result<(), SynthesisError> {
            std::fs::write(output, format!("MP3:{}", text)).map_err(|source| {
                SynthesisError::WriteAudio {
                    path: output.to_path_buf(),
                    source,
                }
            })
        }
    }

    struct TestApp {
        _temp_dir: TempDir,
        controller: Arc<JobController>,
        app: Router,
    }

    impl TestApp {
        fn new(max_file_size: u64) -> Self {
            let temp_dir = TempDir::new().unwrap();
            let config = Config {
                upload_folder: temp_dir.path().join("uploads"),
                audio_folder: temp_dir.path().join("audio"),
                max_file_size,
                worker_count: 2,
                ..Config::default()
            };
            let controller = Arc::new(
                JobController::new(&config, Arc::new(BytesAsText), Arc::new(FakeSynthesizer))
                    .unwrap(),
            );
            let app = create_app(AppState::new(Arc::clone(&controller)));
            Self {
                _temp_dir: temp_dir,
                controller,
                app,
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, headers, body.to_vec())
        }

        async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
            let (status, _, body) = self
                .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        async fn upload(&self, filename: &str, content: &[u8]) -> (StatusCode, Value) {
            let (status, _, body) = self.send(multipart_request(filename, content)).await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        async fn wait_until_finished(&self, job_id: &str) -> Value {
            for _ in 0..500 {
                let (_, body) = self.get_json(&format!("/api/job/{}/progress", job_id)).await;
                if body["completed"] == true || body["failed"] == true {
                    return body;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            panic!("job {} did not finish", job_id);
        }
    }

    impl Drop for TestApp {
        fn drop(&mut self) {
            self.controller.shutdown();
        }
    }

    fn multipart_request(filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/pdf\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_poll_download() {
        let app = TestApp::new(1024);

        let (status, body) = app.upload("Hello World.pdf", b"hello world").await;
        assert_eq!(status, StatusCode::CREATED);
        let job_id = body["jobId"].as_str().unwrap().to_string();

        let progress = app.wait_until_finished(&job_id).await;
        assert_eq!(progress["status"], "completed");
        assert_eq!(progress["progress"], 100);
        assert_eq!(progress["error_message"], Value::Null);

        let (status, headers, body) = app
            .send(
                Request::builder()
                    .uri(format!("/download/{}", job_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
        assert!(headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("filename=\"Hello World.mp3\""));
        assert_eq!(body, b"MP3:hello world".to_vec());
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let app = TestApp::new(1024);

        let (status, body) = app.upload("report.txt", b"hello").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("report.txt"));

        let (_, jobs) = app.get_json("/api/jobs").await;
        assert_eq!(jobs.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_oversize() {
        let app = TestApp::new(8);

        let (status, _) = app.upload("big.pdf", b"more than eight bytes").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, jobs) = app.get_json("/api/jobs").await;
        assert_eq!(jobs.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let app = TestApp::new(1024);

        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{b}--\r\n",
            b = BOUNDARY
        );
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, _, _) = app.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let app = TestApp::new(1024);

        let (status, body) = app.get_json("/api/job/missing/progress").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Job not found");

        let (status, body) = app.get_json("/download/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Job not found");
    }

    #[tokio::test]
    async fn test_failed_job_has_no_audio() {
        let app = TestApp::new(1024);

        let (_, body) = app.upload("blank.pdf", b"   ").await;
        let job_id = body["jobId"].as_str().unwrap().to_string();

        let progress = app.wait_until_finished(&job_id).await;
        assert_eq!(progress["status"], "failed");
        assert_eq!(progress["error_message"], "No text found in source document");

        let (status, body) = app.get_json(&format!("/download/{}", job_id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Audio not available");
    }

    #[tokio::test]
    async fn test_list_jobs_newest_first() {
        let app = TestApp::new(1024);

        let (_, first) = app.upload("one.pdf", b"one").await;
        let (_, second) = app.upload("two.pdf", b"two").await;

        let (status, jobs) = app.get_json("/api/jobs").await;
        assert_eq!(status, StatusCode::OK);
        let jobs = jobs.as_array().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0]["jobId"], second["jobId"]);
        assert_eq!(jobs[1]["jobId"], first["jobId"]);
        assert!(jobs[0]["createdAtDisplay"].is_string());
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new(1024);

        let (status, body) = app.get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["queuedJobs"].is_number());
        assert_eq!(body["streamSubscribers"], 0);
    }

    #[tokio::test]
    async fn test_health_counts_finished_jobs() {
        let app = TestApp::new(1024);

        let (_, ok) = app.upload("good.pdf", b"hello world").await;
        let (_, bad) = app.upload("blank.pdf", b"   ").await;
        app.wait_until_finished(ok["jobId"].as_str().unwrap()).await;
        app.wait_until_finished(bad["jobId"].as_str().unwrap()).await;

        let (_, body) = app.get_json("/api/health").await;
        assert_eq!(body["activeJobs"], 0);
        assert_eq!(body["completedJobs"], 1);
        assert_eq!(body["failedJobs"], 1);
    }
}

//! Test harness for isolated controller runs.
//!
//! The `TestHarness` owns temporary upload/audio directories and a real
//! `JobController` wired to the lopdf extractor (or a test double) and a
//! recording synthesizer, so no test touches the network.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use audiobook::{
    Config, JobController, JobStatusView, PdfTextExtractor, ProcessError, SpeechSynthesizer,
    SynthesisError, TextExtractor,
};

use super::builders::ConfigBuilder;

const FINISH_TIMEOUT: Duration = Duration::from_secs(20);

/// One synthesizer call.
#[derive(Debug, Clone)]
pub struct SynthesisCall {
    pub text: String,
    pub language: String,
    pub output: PathBuf,
}

/// Writes a fake MP3 and remembers what it was asked to say.
#[derive(Default)]
pub struct RecordingSynthesizer {
    calls: Mutex<Vec<SynthesisCall>>,
}

impl RecordingSynthesizer {
    pub fn calls(&self) -> Vec<SynthesisCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        language: &str,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        self.calls.lock().unwrap().push(SynthesisCall {
            text: text.to_string(),
            language: language.to_string(),
            output: output.to_path_buf(),
        });
        std::fs::write(output, b"ID3fake-mp3").map_err(|source| SynthesisError::WriteAudio {
            path: output.to_path_buf(),
            source,
        })
    }
}

/// Delegates to the lopdf extractor, but only after a permit is released.
///
/// Lets a test hold a job in `Processing` (and keep a worker busy) for as
/// long as it needs.
pub struct GatedExtractor {
    permits: Mutex<Receiver<()>>,
    inner: PdfTextExtractor,
}

impl GatedExtractor {
    pub fn new() -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = channel();
        let extractor = Arc::new(Self {
            permits: Mutex::new(rx),
            inner: PdfTextExtractor::new(),
        });
        (extractor, tx)
    }
}

impl TextExtractor for GatedExtractor {
    fn extract(
        &self,
        path: &Path,
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<String, ProcessError> {
        // A dropped sender (or a forgotten permit) releases the job
        let _ = self.permits.lock().unwrap().recv_timeout(FINISH_TIMEOUT);
        self.inner.extract(path, on_page)
    }
}

/// Isolated controller environment.
pub struct TestHarness {
    temp_dir: TempDir,
    pub controller: JobController,
    pub synthesizer: Arc<RecordingSynthesizer>,
}

impl TestHarness {
    /// Controller with the real PDF extractor and two workers.
    pub fn new() -> Self {
        Self::with_config(|builder| builder)
    }

    /// Controller with the real PDF extractor and a customized config.
    pub fn with_config(configure: impl FnOnce(ConfigBuilder) -> ConfigBuilder) -> Self {
        Self::build(configure, Arc::new(PdfTextExtractor::new()))
    }

    /// Controller with a custom extractor.
    pub fn with_extractor(
        extractor: Arc<dyn TextExtractor>,
        configure: impl FnOnce(ConfigBuilder) -> ConfigBuilder,
    ) -> Self {
        Self::build(configure, extractor)
    }

    fn build(
        configure: impl FnOnce(ConfigBuilder) -> ConfigBuilder,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config: Config = configure(ConfigBuilder::new(temp_dir.path())).build();
        let synthesizer = Arc::new(RecordingSynthesizer::default());
        let controller = JobController::new(&config, extractor, synthesizer.clone())
            .expect("Failed to start controller");

        Self {
            temp_dir,
            controller,
            synthesizer,
        }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.temp_dir.path().join("uploads")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.temp_dir.path().join("audio")
    }

    /// Number of files written to the upload directory.
    pub fn stored_uploads(&self) -> usize {
        std::fs::read_dir(self.upload_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Polls until the job is completed or failed.
    pub fn wait_until_finished(&self, job_id: &str) -> JobStatusView {
        let deadline = Instant::now() + FINISH_TIMEOUT;
        loop {
            let view = self
                .controller
                .get_status(job_id)
                .expect("job vanished from store");
            if view.status.is_terminal() {
                return view;
            }
            assert!(
                Instant::now() < deadline,
                "job {} still {:?} after {:?}",
                job_id,
                view.status,
                FINISH_TIMEOUT
            );
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    /// Polls until the job leaves `Pending`.
    pub fn wait_until_started(&self, job_id: &str) -> JobStatusView {
        let deadline = Instant::now() + FINISH_TIMEOUT;
        loop {
            let view = self.controller.get_status(job_id).unwrap();
            if view.status != audiobook::JobStatus::Pending {
                return view;
            }
            assert!(Instant::now() < deadline, "job {} never started", job_id);
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}

use std::path::PathBuf;

use crate::worker::job::Job;

pub struct PipelineContext {
    pub job: Job,

    /// Extracted document text, set after extraction.
    pub text: Option<String>,

    /// Number of pages the extractor reported.
    pub pages: usize,

    /// Portion of `text` sent to the synthesizer.
    pub synthesis_text: Option<String>,

    pub audio_path: Option<PathBuf>,
}

impl PipelineContext {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            text: None,
            pages: 0,
            synthesis_text: None,
            audio_path: None,
        }
    }
}

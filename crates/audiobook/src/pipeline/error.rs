use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Text extraction failed: {0}")]
    Extraction(#[from] crate::error::ProcessError),

    #[error("No text found in source document")]
    NoText,

    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] crate::error::SynthesisError),

    #[error("Conversion aborted unexpectedly: {0}")]
    Panicked(String),
}

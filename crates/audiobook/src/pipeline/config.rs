use crate::config::Config;
use crate::storage::FileStorage;

/// Upper bound on the characters handed to the speech synthesizer per job.
pub const MAX_SYNTHESIS_CHARS: usize = 5000;

pub struct PipelineConfig {
    /// Language code for synthesis, e.g. `bn`.
    pub language: String,
    pub max_synthesis_chars: usize,
    pub storage: FileStorage,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.language.clone(),
            max_synthesis_chars: MAX_SYNTHESIS_CHARS,
            storage: config.storage(),
        }
    }
}

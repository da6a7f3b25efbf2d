//! Speech synthesis through the public Google Translate TTS endpoint.
//!
//! The endpoint only accepts short inputs, so the text is split into chunks
//! and the returned MP3 segments are concatenated into a single file.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::SynthesisError;
use crate::synthesis::{split_into_chunks, SpeechSynthesizer};

/// Default Google Translate TTS endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Longest input the endpoint accepts per request, in characters.
const MAX_CHUNK_CHARS: usize = 100;

/// Maximum length for error bodies kept in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 200;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking Google Translate TTS client.
///
/// Construct it outside of any async runtime; it is used from worker threads.
pub struct GoogleTranslateTts {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateTts {
    pub fn new() -> Result<Self, SynthesisError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("audiobook/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn fetch_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
        language: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&chunk_query(chunk, index, total, language))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SynthesisError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(response.bytes()?.to_vec())
    }

    fn write_chunks(
        &self,
        chunks: &[String],
        language: &str,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let write_err = |e| SynthesisError::WriteAudio {
            path: output.to_path_buf(),
            source: e,
        };

        let mut file = File::create(output).map_err(write_err)?;
        for (index, chunk) in chunks.iter().enumerate() {
            let audio = self.fetch_chunk(chunk, index, chunks.len(), language)?;
            file.write_all(&audio).map_err(write_err)?;
        }
        file.flush().map_err(write_err)
    }
}

impl SpeechSynthesizer for GoogleTranslateTts {
    fn synthesize(
        &self,
        text: &str,
        language: &str,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        let chunks = split_into_chunks(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        tracing::debug!(chunks = chunks.len(), language, "Requesting speech");

        let result = self.write_chunks(&chunks, language, output);
        if result.is_err() {
            // Best effort: never leave a truncated artifact behind
            let _ = std::fs::remove_file(output);
        }
        result
    }
}

fn chunk_query(chunk: &str, index: usize, total: usize, language: &str) -> Vec<(String, String)> {
    vec![
        ("ie".to_string(), "UTF-8".to_string()),
        ("client".to_string(), "tw-ob".to_string()),
        ("tl".to_string(), language.to_string()),
        ("q".to_string(), chunk.to_string()),
        ("total".to_string(), total.to_string()),
        ("idx".to_string(), index.to_string()),
        ("textlen".to_string(), chunk.chars().count().to_string()),
    ]
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", truncated)
    } else {
        body.to_string()
    }
}

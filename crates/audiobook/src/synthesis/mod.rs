//! Text-to-speech backends.

pub mod google;

use std::path::Path;

use crate::error::SynthesisError;

pub use google::GoogleTranslateTts;

/// Extension of every audio artifact produced by a synthesizer.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Turns text into an audio file.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` spoken in `language` (a BCP-47 style code such as
    /// `bn`) and writes the MP3 audio to `output`.
    fn synthesize(&self, text: &str, language: &str, output: &Path)
        -> Result<(), SynthesisError>;
}

/// Sentence terminators, including the Bengali danda. A `.` only ends a
/// sentence when whitespace or the end of the text follows it.
const SENTENCE_ENDINGS: &[char] = &['.', '!', '?', '।', '॥', '\n'];

/// Splits `text` after each sentence terminator, keeping the terminator.
fn sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if !SENTENCE_ENDINGS.contains(&ch) {
            continue;
        }
        if ch == '.' && chars.peek().is_some_and(|(_, next)| !next.is_whitespace()) {
            continue;
        }
        let end = index + ch.len_utf8();
        sentences.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Splits `text` into chunks of at most `max_chars` characters.
///
/// Sentence boundaries are preferred, then whitespace. A single word longer
/// than `max_chars` is cut mid-word. Whitespace runs collapse to one space
/// and empty pieces are dropped.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();

    for sentence in sentences(text) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0;
        for word in words {
            let word_len = word.chars().count();
            let needed = if current.is_empty() {
                word_len
            } else {
                current_len + 1 + word_len
            };

            if needed <= max_chars {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_len = needed;
                continue;
            }

            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }

            if word_len <= max_chars {
                current.push_str(word);
                current_len = word_len;
            } else {
                let chars: Vec<char> = word.chars().collect();
                let mut pieces = chars.chunks(max_chars).peekable();
                while let Some(piece) = pieces.next() {
                    if pieces.peek().is_some() {
                        chunks.push(piece.iter().collect());
                    } else {
                        current = piece.iter().collect();
                        current_len = piece.len();
                    }
                }
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }
    }

    chunks
}

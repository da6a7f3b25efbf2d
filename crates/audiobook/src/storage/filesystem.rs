use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::sanitize;
use crate::synthesis::AUDIO_EXTENSION;

/// On-disk layout for uploads and synthesized audio.
#[derive(Debug, Clone)]
pub struct FileStorage {
    upload_directory: PathBuf,
    audio_directory: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(upload_directory: P, audio_directory: Q) -> Self {
        Self {
            upload_directory: upload_directory.as_ref().to_path_buf(),
            audio_directory: audio_directory.as_ref().to_path_buf(),
        }
    }

    pub fn upload_directory(&self) -> &Path {
        &self.upload_directory
    }

    pub fn audio_directory(&self) -> &Path {
        &self.audio_directory
    }

    /// Creates the upload and audio directories if missing.
    pub fn ensure_directories(&self) -> Result<(), StorageError> {
        ensure_directory(&self.upload_directory)?;
        ensure_directory(&self.audio_directory)
    }

    /// Writes an accepted upload as `<uuid>_<basename>` and returns its path.
    pub fn store_upload(&self, content: &[u8], filename: &str) -> Result<PathBuf, StorageError> {
        ensure_directory(&self.upload_directory)?;

        let basename = sanitize::upload_basename(filename);
        let stored_name = format!("{}_{}", uuid::Uuid::new_v4(), basename);
        let path = self.upload_directory.join(stored_name);

        // create_new: a random prefix collision must never overwrite another upload
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StorageError::WriteFile {
                path: path.clone(),
                source: e,
            })?;
        file.write_all(content)
            .and_then(|_| file.flush())
            .map_err(|e| StorageError::WriteFile {
                path: path.clone(),
                source: e,
            })?;

        Ok(path)
    }

    /// Artifact location for a job: `<stem>_<job_id>.mp3` in the audio directory.
    pub fn audio_path_for(&self, stem: &str, job_id: &str) -> PathBuf {
        self.audio_directory
            .join(format!("{}_{}.{}", stem, job_id, AUDIO_EXTENSION))
    }
}

fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Suggested download name for a job's audio: `<stem>.mp3`.
pub fn download_name(stem: &str) -> String {
    format!("{}.{}", stem, AUDIO_EXTENSION)
}

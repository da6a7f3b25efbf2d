use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::StorageError;
use crate::storage::FileStorage;

pub const DEFAULT_SECRET_KEY: &str = "change-me-in-production";
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";
pub const DEFAULT_AUDIO_FOLDER: &str = "audio";
/// 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
/// Bengali.
pub const DEFAULT_LANGUAGE: &str = "bn";

/// Runtime configuration, normally read from the environment.
#[derive(Debug)]
pub struct Config {
    /// Session/signing secret. There is no session layer; it is only carried.
    pub secret_key: SecretString,
    pub upload_folder: PathBuf,
    pub audio_folder: PathBuf,
    /// Largest accepted upload, in bytes.
    pub max_file_size: u64,
    pub host: String,
    pub port: u16,
    /// Number of conversions allowed to run at the same time.
    pub worker_count: usize,
    /// Language code passed to the speech synthesizer.
    pub language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: SecretString::from(DEFAULT_SECRET_KEY),
            upload_folder: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            audio_folder: PathBuf::from(DEFAULT_AUDIO_FOLDER),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            worker_count: default_worker_count(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

pub fn default_worker_count() -> usize {
    num_cpus::get().max(1)
}

impl Config {
    /// True when `SECRET_KEY` was not supplied.
    pub fn uses_default_secret(&self) -> bool {
        use secrecy::ExposeSecret;
        self.secret_key.expose_secret() == DEFAULT_SECRET_KEY
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.upload_folder, &self.audio_folder)
    }

    /// Creates the upload and audio folders if missing.
    pub fn ensure_directories(&self) -> Result<(), StorageError> {
        self.storage().ensure_directories()
    }
}

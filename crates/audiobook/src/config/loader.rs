use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

use crate::config::schema::Config;
use crate::error::ConfigError;

/// Builds a [`Config`] from the process environment.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    load_config_from_lookup(|name| std::env::var(name).ok())
}

/// Builds a [`Config`] from an arbitrary variable lookup.
///
/// Unset and blank variables fall back to their defaults.
pub fn load_config_from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let mut config = Config::default();

    if let Some(secret) = get("SECRET_KEY") {
        config.secret_key = SecretString::from(secret);
    }
    if let Some(folder) = get("UPLOAD_FOLDER") {
        config.upload_folder = PathBuf::from(folder);
    }
    if let Some(folder) = get("AUDIO_FOLDER") {
        config.audio_folder = PathBuf::from(folder);
    }
    if let Some(value) = get("MAX_FILE_SIZE") {
        config.max_file_size = parse_number("MAX_FILE_SIZE", &value)?;
    }
    if let Some(host) = get("HOST") {
        config.host = host.trim().to_string();
    }
    if let Some(value) = get("PORT") {
        config.port = parse_number("PORT", &value)?;
    }
    if let Some(value) = get("WORKER_COUNT") {
        config.worker_count = parse_number("WORKER_COUNT", &value)?;
    }
    if let Some(language) = get("TTS_LANGUAGE") {
        config.language = language.trim().to_string();
    }

    validate_config(&config)?;
    Ok(config)
}

fn parse_number<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.worker_count == 0 {
        return Err(ConfigError::InvalidValue {
            name: "WORKER_COUNT".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if config.max_file_size == 0 {
        return Err(ConfigError::InvalidValue {
            name: "MAX_FILE_SIZE".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1 byte".to_string(),
        });
    }

    Ok(())
}

//! Global tracing setup.
//!
//! Library code logs through both `tracing` and the `log` facade; `log`
//! records are forwarded into the tracing subscriber.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::error::{AudiobookError, Result};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info,audiobook=debug";

/// Builds the `EnvFilter`, preferring `RUST_LOG` over `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Installs the global subscriber and the `log` bridge.
///
/// Fails (instead of panicking) if either is already installed.
pub fn init_logging(default_filter: &str) -> Result<()> {
    tracing_log::LogTracer::init().map_err(|e| AudiobookError::Logging(e.to_string()))?;

    let subscriber = Registry::default()
        .with(env_filter(default_filter))
        .with(fmt::layer().with_target(true));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AudiobookError::Logging(e.to_string()))
}

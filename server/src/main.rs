//! audiobook-server binary.
//!
//! Loads configuration from the environment, starts the conversion workers
//! and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use audiobook::logging::{init_logging, DEFAULT_FILTER};
use audiobook::{load_config_from_env, Config, GoogleTranslateTts, JobController, PdfTextExtractor};
use audiobook_server::{create_app, AppState};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    init_logging(DEFAULT_FILTER)?;
    info!("Starting audiobook server v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config_from_env().context("Invalid configuration")?;
    if config.uses_default_secret() {
        warn!("SECRET_KEY is not set; using the built-in default");
    }

    // The blocking HTTP client must be built outside the async runtime
    let synthesizer = GoogleTranslateTts::new().context("Failed to build speech client")?;
    let controller = Arc::new(
        JobController::new(
            &config,
            Arc::new(PdfTextExtractor::new()),
            Arc::new(synthesizer),
        )
        .context("Failed to start job controller")?,
    );
    info!(
        "Uploads in {:?}, audio in {:?}, {} workers",
        config.upload_folder, config.audio_folder, config.worker_count
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    let served = runtime.block_on(serve(&config, Arc::clone(&controller)));
    drop(runtime);

    controller.shutdown();
    info!("Audiobook server stopped");
    served
}

async fn serve(config: &Config, controller: Arc<JobController>) -> Result<()> {
    let state = AppState::new(controller);
    let shutdown = state.shutdown.clone();
    let app = create_app(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")
}

async fn shutdown_signal(token: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
    token.cancel();
}

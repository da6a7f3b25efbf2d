use std::sync::Arc;
use std::time::Instant;

use audiobook::JobController;
use tokio_util::sync::CancellationToken;

/// Shared state behind every route.
pub struct AppState {
    pub controller: Arc<JobController>,
    pub start_time: Instant,
    /// Cancelled when the server begins shutting down; ends open SSE streams.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(controller: Arc<JobController>) -> Arc<Self> {
        Arc::new(Self {
            controller,
            start_time: Instant::now(),
            shutdown: CancellationToken::new(),
        })
    }
}

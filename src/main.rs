//! This file defines the common-queries binary entry point.

use common_queries::app;
use common_queries::app_state::AppState;
use common_queries::cli;
use common_queries::metrics;
use common_queries::server;
use common_queries::tracing;

use std::sync::Arc;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    metrics::register_metrics();
    let state = AppState::new(&args).expect("failed to create search backend client");
    let service = app::service(Arc::new(state));
    let result = server::serve(&args, service).await;
    if let Err(err) = &result {
        ::tracing::error!(%err, "Server failed");
    }
    tracing::shutdown_tracing();
    if result.is_err() {
        std::process::exit(1);
    }
}

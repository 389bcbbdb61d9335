//! This file defines the crude-assay binary entry point.

use crude_assay::app;
use crude_assay::app_state::AppState;
use crude_assay::cli;
use crude_assay::metrics;
use crude_assay::server;
use crude_assay::store::PgAssayStore;
use crude_assay::tracing;

use std::process::exit;
use std::sync::Arc;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    metrics::register_metrics();
    let store = match PgAssayStore::connect_lazy(&args) {
        Ok(store) => store,
        Err(err) => {
            ::tracing::error!("failed to configure the assay database: {:?}", err);
            exit(1)
        }
    };
    let state = Arc::new(AppState::new(Box::new(store.clone())));
    let service = app::service(state);
    server::serve(&args, service).await;
    store.close().await;
    tracing::shutdown_tracing();
}

//! Web front end for the price form
//!
//! Serves the form page, re-prices on every change through an htmx post of
//! the form, and exposes a health probe.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use crate::config::AppConfig;
use crate::pipeline::ModelStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Fit the model, then serve until ctrl+c
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        data_path = %config.data_path.display(),
        trees = config.model.n_estimators,
        watch = config.watch_dataset,
        "Fitting price model"
    );

    let data_path = config.data_path.clone();
    let settings = config.model.clone();
    let store = tokio::task::spawn_blocking(move || ModelStore::load(data_path, settings)).await??;
    let store = Arc::new(store);

    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&store)));
    let gaps = state.form.audit(store.current().transformer().vocabularies());
    if !gaps.is_empty() {
        warn!(count = gaps.len(), "Some form options are absent from the dataset");
    }

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        pid = std::process::id(),
        started_at = %start_time.to_rfc3339(),
        "Server listening"
    );
    info!(url = %format!("http://{}", addr), "Form available");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(uptime_secs = uptime.num_seconds(), "Shutdown signal received, stopping server gracefully");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

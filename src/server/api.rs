//! Route definitions

use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::serve_index))
        .route("/predict", post(handlers::predict_form))
        .route("/health", get(handlers::health_check))
        .fallback(handlers::handle_404)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

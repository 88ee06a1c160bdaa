//! Request handlers

use super::error::{Result, ServerError};
use super::state::AppState;
use crate::data::CarQuery;
use crate::form::{render_page, render_price, FormInput, PriceView};
use crate::pipeline::FittedPipeline;
use axum::{
    extract::{Form, State},
    response::Html,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// The pipeline to predict with, refitted first when dataset watching is on
/// and the file changed. A failed refit keeps serving the previous pipeline.
async fn current_pipeline(state: &Arc<AppState>) -> Result<Arc<FittedPipeline>> {
    if state.config.watch_dataset {
        let store = Arc::clone(&state.store);
        match tokio::task::spawn_blocking(move || store.refresh_if_stale()).await? {
            Ok(true) => {
                let gaps = state.form.audit(state.store.current().transformer().vocabularies());
                debug!(gaps = gaps.len(), "Vocabulary audited after refit");
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Dataset refit failed, keeping previous model"),
        }
    }
    Ok(state.store.current())
}

async fn price_view(state: &Arc<AppState>, query: CarQuery) -> Result<PriceView> {
    let pipeline = current_pipeline(state).await?;
    let result = tokio::task::spawn_blocking(move || pipeline.predict(&query)).await?;
    Ok(PriceView::from_result(&result, &state.config.currency_symbol))
}

/// Full page with the default inputs and their price
pub async fn serve_index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let query = state.form.default_query();
    let view = price_view(&state, query.clone()).await?;
    Ok(Html(render_page(&state.form, &query, Some(&view))))
}

/// Price fragment for one form submission
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    Form(input): Form<FormInput>,
) -> Result<Html<String>> {
    let query = input.into_query(&state.form);
    let view = price_view(&state, query).await?;
    Ok(Html(render_price(&view)))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let pipeline = state.store.current();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime_secs(),
        "data_path": state.store.data_path().display().to_string(),
        "watch_dataset": state.config.watch_dataset,
        "model": pipeline.summary(),
    }))
}

pub async fn handle_404() -> ServerError {
    ServerError::NotFound("Visit / for the form or /health for status".to_string())
}

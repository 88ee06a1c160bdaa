//! Application state management

use crate::config::AppConfig;
use crate::form::FormSpec;
use crate::pipeline::ModelStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<ModelStore>,
    pub form: FormSpec,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<ModelStore>) -> Self {
        Self {
            config,
            store,
            form: FormSpec::standard(),
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}

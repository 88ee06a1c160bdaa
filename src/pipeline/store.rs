//! Process-wide holder of the current fitted pipeline

use super::fitted::FittedPipeline;
use crate::config::ModelSettings;
use crate::data::CarQuery;
use crate::error::Result;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// Caches one [`FittedPipeline`] built from a dataset file.
///
/// Readers clone the `Arc` and drop the lock before predicting. Refits run
/// outside the lock and are serialized among themselves.
pub struct ModelStore {
    data_path: PathBuf,
    settings: ModelSettings,
    pipeline: RwLock<Arc<FittedPipeline>>,
    /// Modification time of the file at the last fit attempt, successful or not
    attempted: Mutex<Option<SystemTime>>,
}

impl ModelStore {
    /// Load and fit the dataset at `path`
    pub fn load(path: impl Into<PathBuf>, settings: ModelSettings) -> Result<Self> {
        let data_path = path.into();
        let modified = modified_time(&data_path);
        let pipeline = FittedPipeline::from_path(&data_path, &settings)?;

        Ok(Self {
            data_path,
            settings,
            pipeline: RwLock::new(Arc::new(pipeline)),
            attempted: Mutex::new(modified),
        })
    }

    /// The pipeline currently served
    pub fn current(&self) -> Arc<FittedPipeline> {
        Arc::clone(&self.pipeline.read())
    }

    pub fn predict(&self, query: &CarQuery) -> Result<f64> {
        self.current().predict(query)
    }

    /// Refit from the file as it is now and swap the result in.
    /// On error the previous pipeline stays in place.
    pub fn reload(&self) -> Result<Arc<FittedPipeline>> {
        let mut attempted = self.attempted.lock();
        self.reload_locked(&mut attempted)
    }

    fn reload_locked(&self, attempted: &mut Option<SystemTime>) -> Result<Arc<FittedPipeline>> {
        *attempted = modified_time(&self.data_path);
        let pipeline = Arc::new(FittedPipeline::from_path(&self.data_path, &self.settings)?);

        *self.pipeline.write() = Arc::clone(&pipeline);
        info!(
            path = %self.data_path.display(),
            rows = pipeline.summary().rows,
            "Model reloaded"
        );
        Ok(pipeline)
    }

    /// Reload only if the file's modification time differs from the one
    /// seen at the last fit attempt. Returns whether a refit happened.
    ///
    /// A file that failed to fit is not retried until it changes again.
    pub fn refresh_if_stale(&self) -> Result<bool> {
        let mut attempted = self.attempted.lock();
        if modified_time(&self.data_path) == *attempted {
            debug!(path = %self.data_path.display(), "Dataset unchanged");
            return Ok(false);
        }

        self.reload_locked(&mut attempted)?;
        Ok(true)
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

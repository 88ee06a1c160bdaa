//! Application configuration
//!
//! Values are layered: [`AppConfig::default`], then an optional TOML file,
//! then environment variables, then command-line flags (applied by the CLI).

use crate::error::{PriceError, Result};
use crate::preprocessing::UnknownCategoryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the dataset path
pub const ENV_DATA_PATH: &str = "CAR_PRICE_DATA";
/// Environment variable holding the bind host
pub const ENV_HOST: &str = "API_HOST";
/// Environment variable holding the bind port
pub const ENV_PORT: &str = "API_PORT";
/// Environment variable toggling dataset change detection
pub const ENV_WATCH: &str = "CAR_PRICE_WATCH";

/// Estimator and encoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Trees in the forest
    pub n_estimators: usize,
    /// Base seed of the forest
    pub random_state: u64,
    /// Handling of categories missing from the dataset
    pub unknown_category: UnknownCategoryPolicy,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            random_state: 42,
            unknown_category: UnknownCategoryPolicy::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Historical listings table
    pub data_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Refit when the dataset's modification time changes
    pub watch_dataset: bool,
    pub model: ModelSettings,
    /// Prefix of rendered prices
    pub currency_symbol: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/car_data.csv"),
            host: "127.0.0.1".to_string(),
            port: 8080,
            watch_dataset: false,
            model: ModelSettings::default(),
            currency_symbol: "₹".to_string(),
        }
    }
}

impl AppConfig {
    /// Read a TOML file; keys it omits keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| PriceError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Defaults, overlaid by `path` when given, then by the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from `lookup`, usually the process environment
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATA_PATH) {
            self.data_path = PathBuf::from(path);
        }
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| PriceError::ConfigError(format!("{} is not a port: {:?}", ENV_PORT, port)))?;
        }
        if let Some(watch) = lookup(ENV_WATCH) {
            self.watch_dataset = parse_flag(&watch)
                .ok_or_else(|| PriceError::ConfigError(format!("{} is not a boolean: {:?}", ENV_WATCH, watch)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.n_estimators == 0 {
            return Err(PriceError::ConfigError("model.n_estimators must be at least 1".to_string()));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(PriceError::ConfigError("data_path is empty".to_string()));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.model.random_state, 42);
        assert_eq!(config.model.unknown_category, UnknownCategoryPolicy::Error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "data_path = \"/srv/cars.xlsx\"\nport = 9000\n\n[model]\nunknown_category = \"ignore\""
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/cars.xlsx"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.model.unknown_category, UnknownCategoryPolicy::Ignore);
    }

    #[test]
    fn test_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"eighty\"").unwrap();
        assert!(matches!(AppConfig::from_file(file.path()), Err(PriceError::ConfigError(_))));
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            (ENV_DATA_PATH, "other.csv"),
            (ENV_PORT, "3000"),
            (ENV_WATCH, "yes"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_from(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.port, 3000);
        assert!(config.watch_dataset);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let mut config = AppConfig::default();
        let result = config.apply_env_from(|k| (k == ENV_PORT).then(|| "http".to_string()));
        assert!(matches!(result, Err(PriceError::ConfigError(_))));
    }

    #[test]
    fn test_zero_trees_invalid() {
        let mut config = AppConfig::default();
        config.model.n_estimators = 0;
        assert!(config.validate().is_err());
    }
}

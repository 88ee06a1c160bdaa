//! Used-car resale price predictor
//!
//! A random forest fitted on a table of historical listings prices the car
//! described by a nine-input form.
//!
//! # Modules
//!
//! - [`data`] - dataset loading, schema and query records
//! - [`preprocessing`] - standard scaling and one-hot encoding
//! - [`training`] - regression tree and random forest
//! - [`pipeline`] - fitted pipeline and the shared model store
//! - [`form`] - form fields, clamping and HTML rendering
//! - [`config`] - layered application configuration
//! - [`server`] - web front end
//! - [`cli`] - command-line interface

pub mod error;

pub mod config;
pub mod data;
pub mod form;
pub mod pipeline;
pub mod preprocessing;
pub mod training;

pub mod cli;
pub mod server;

pub use error::{PriceError, Result};

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::{AppConfig, ModelSettings};
    pub use crate::data::{load_dataset, CarQuery, FeatureLayout};
    pub use crate::error::{PriceError, Result};
    pub use crate::form::{format_price, FormInput, FormSpec};
    pub use crate::pipeline::{FittedPipeline, ModelStore, ModelSummary};
    pub use crate::preprocessing::{ColumnTransformer, UnknownCategoryPolicy};
    pub use crate::training::{RandomForestRegressor, RegressionTree};
}

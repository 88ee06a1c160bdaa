//! Historical dataset handling
//!
//! - [`loader`] reads the dataset file (CSV, TSV, Parquet, JSON, Excel)
//! - [`schema`] names the ten columns and checks they are present
//! - [`split`] separates the `Price` target from the feature columns
//! - [`record`] holds the immutable query record built from the form

pub mod loader;
pub mod record;
pub mod schema;
pub mod split;

pub use loader::{
    load_dataset, read_dataset, ColumnSummary, DataLoader, DatasetSummary, FileFormat,
    LoadedDataset,
};
pub use record::CarQuery;
pub use schema::{FeatureLayout, validate_schema};
pub use split::{split_features_target, FeatureSplit, numeric_values, categorical_values};

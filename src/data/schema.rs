//! Column names and the feature layout of the historical table

use crate::error::{PriceError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const CITY: &str = "City";
pub const FUEL_TYPE: &str = "Fuel_Type";
pub const BODY_TYPE: &str = "Body_Type";
pub const TRANSMISSION_TYPE: &str = "Transmission_Type";
pub const SEATS: &str = "Seats";
pub const ENGINE_DISPLACEMENT: &str = "Engine_Displacement";
pub const KILOMETERS_DRIVEN: &str = "Kilometers_Driven";
pub const YEAR_OF_MANUFACTURE: &str = "Year_of_Manufacture";
pub const PREVIOUS_OWNERS: &str = "Previous_Owners";

/// Target column
pub const PRICE: &str = "Price";

/// The nine feature columns of a query record, in form order
pub const FEATURE_COLUMNS: [&str; 9] = [
    CITY,
    FUEL_TYPE,
    BODY_TYPE,
    TRANSMISSION_TYPE,
    SEATS,
    ENGINE_DISPLACEMENT,
    KILOMETERS_DRIVEN,
    YEAR_OF_MANUFACTURE,
    PREVIOUS_OWNERS,
];

/// Which feature columns feed the model and how they are encoded.
///
/// Columns listed in neither block are carried in the query record but
/// dropped by the column transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub numerical: Vec<String>,
    pub categorical: Vec<String>,
}

impl Default for FeatureLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl FeatureLayout {
    /// Four standardized numeric columns and four one-hot columns.
    /// `Previous_Owners` is not a model input.
    pub fn standard() -> Self {
        Self {
            numerical: [SEATS, ENGINE_DISPLACEMENT, KILOMETERS_DRIVEN, YEAR_OF_MANUFACTURE]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            categorical: [CITY, FUEL_TYPE, BODY_TYPE, TRANSMISSION_TYPE]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Numerical then categorical column names
    pub fn model_columns(&self) -> Vec<String> {
        self.numerical.iter().chain(self.categorical.iter()).cloned().collect()
    }

    /// Feature columns present in the record but unused by the model
    pub fn dropped_columns(&self) -> Vec<&'static str> {
        FEATURE_COLUMNS
            .iter()
            .copied()
            .filter(|c| !self.numerical.iter().any(|n| n == c) && !self.categorical.iter().any(|n| n == c))
            .collect()
    }
}

/// Check that every feature column and the target exist with their exact names.
/// Column order and extra columns are irrelevant.
pub fn validate_schema(df: &DataFrame) -> Result<()> {
    let missing: Vec<&str> = FEATURE_COLUMNS
        .iter()
        .chain(std::iter::once(&PRICE))
        .copied()
        .filter(|name| df.column(name).is_err())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PriceError::FeatureNotFound(missing.join(", ")))
    }
}

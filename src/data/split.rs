//! Feature/target split and typed column extraction

use super::schema::{FeatureLayout, PRICE};
use crate::error::{PriceError, Result};
use ndarray::Array1;
use polars::prelude::*;

/// Feature table and target vector of the historical data
#[derive(Debug, Clone)]
pub struct FeatureSplit {
    /// Model columns only, in layout order
    pub features: DataFrame,
    pub target: Array1<f64>,
}

/// Separate `Price` from the feature columns named by the layout
pub fn split_features_target(df: &DataFrame, layout: &FeatureLayout) -> Result<FeatureSplit> {
    let columns = layout.model_columns();
    for name in &columns {
        if df.column(name).is_err() {
            return Err(PriceError::FeatureNotFound(name.clone()));
        }
    }

    let features = df.select(columns)?;
    let target = Array1::from_vec(numeric_values(df, PRICE)?);

    Ok(FeatureSplit { features, target })
}

fn lookup<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| PriceError::FeatureNotFound(name.to_string()))
}

/// Read a column as `f64`. Nulls and non-numeric cells are errors.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = lookup(df, name)?;
    if series.null_count() > 0 {
        return Err(PriceError::MissingValues {
            column: name.to_string(),
            count: series.null_count(),
        });
    }

    let casted = series.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = casted.f64()?.into_iter().collect();
    let bad = values.iter().filter(|v| v.is_none()).count();
    if bad > 0 {
        return Err(PriceError::DataError(format!(
            "{} has {} non-numeric values",
            name, bad
        )));
    }

    Ok(values.into_iter().flatten().collect())
}

/// Read a column as category labels.
///
/// String columns are taken verbatim. Numeric columns are rendered without a
/// trailing `.0` so that `2.0` and `2` give the same label.
pub fn categorical_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = lookup(df, name)?;
    if series.null_count() > 0 {
        return Err(PriceError::MissingValues {
            column: name.to_string(),
            count: series.null_count(),
        });
    }

    let labels: Vec<String> = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect(),
        dt if dt.is_float() => series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.map(|x| x.to_string()).unwrap_or_default())
            .collect(),
        _ => series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect(),
    };

    Ok(labels)
}

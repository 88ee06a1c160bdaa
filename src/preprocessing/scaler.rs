//! Standard scaling of numerical columns

use crate::data::numeric_values;
use crate::error::{PriceError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters learned for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub column: String,
    /// Column mean
    pub center: f64,
    /// Population standard deviation, 1.0 for a constant column
    pub scale: f64,
}

/// Z-score scaler: `(x - mean) / std` with the population standard deviation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn mean and standard deviation of each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.params = columns
            .iter()
            .map(|name| {
                let values = numeric_values(df, name)?;
                Ok(Self::compute_params(name, &values))
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    fn compute_params(name: &str, values: &[f64]) -> ScalerParams {
        if values.is_empty() {
            return ScalerParams { column: name.to_string(), center: 0.0, scale: 1.0 };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        ScalerParams {
            column: name.to_string(),
            center: mean,
            scale: if std == 0.0 { 1.0 } else { std },
        }
    }

    /// Scale the fitted columns of `df`, one output column per fitted column
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PriceError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut out = Array2::zeros((n_rows, self.params.len()));

        for (j, params) in self.params.iter().enumerate() {
            let values = numeric_values(df, &params.column)?;
            for (i, v) in values.into_iter().enumerate() {
                out[[i, j]] = (v - params.center) / params.scale;
            }
        }

        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Learned parameters in column order
    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }
}

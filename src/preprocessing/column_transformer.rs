//! Column transformer: scaled numerical block followed by indicator blocks

use super::encoder::{OneHotEncoder, UnknownCategoryPolicy, Vocabulary};
use super::scaler::{ScalerParams, StandardScaler};
use crate::data::FeatureLayout;
use crate::error::{PriceError, Result};
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Applies a [`StandardScaler`] to the layout's numerical columns and a
/// [`OneHotEncoder`] to its categorical columns. Other columns are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    layout: FeatureLayout,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl ColumnTransformer {
    pub fn new(layout: FeatureLayout, policy: UnknownCategoryPolicy) -> Self {
        Self {
            layout,
            scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(policy),
            is_fitted: false,
        }
    }

    /// Learn scaling statistics and vocabularies
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.scaler.fit(df, &self.layout.numerical)?;
        self.encoder.fit(df, &self.layout.categorical)?;
        self.is_fitted = true;
        Ok(self)
    }

    /// Produce the model matrix: numerical block, then indicator blocks
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PriceError::ModelNotFitted);
        }

        let numeric = self.scaler.transform(df)?;
        let indicators = self.encoder.transform(df)?;
        Ok(concatenate(Axis(1), &[numeric.view(), indicators.view()])?)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    pub fn n_features_out(&self) -> usize {
        self.layout.numerical.len() + self.encoder.n_features_out()
    }

    /// Output column names in matrix order
    pub fn feature_names(&self) -> Vec<String> {
        self.layout
            .numerical
            .iter()
            .cloned()
            .chain(self.encoder.feature_names())
            .collect()
    }

    /// Source column of every output column, in matrix order
    pub fn source_columns(&self) -> Vec<&str> {
        self.layout
            .numerical
            .iter()
            .map(String::as_str)
            .chain(
                self.encoder
                    .vocabularies()
                    .iter()
                    .flat_map(|v| std::iter::repeat(v.column.as_str()).take(v.categories.len())),
            )
            .collect()
    }

    pub fn scaler_params(&self) -> &[ScalerParams] {
        self.scaler.params()
    }

    pub fn vocabularies(&self) -> &[Vocabulary] {
        self.encoder.vocabularies()
    }
}

//! One-hot encoding of categorical columns

use crate::data::categorical_values;
use crate::error::{PriceError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// What to do with a category that was never seen during fit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategoryPolicy {
    /// Fail with [`PriceError::UnknownCategory`]
    #[default]
    Error,
    /// Encode as an all-zero indicator block
    Ignore,
}

impl std::str::FromStr for UnknownCategoryPolicy {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "ignore" => Ok(Self::Ignore),
            other => Err(PriceError::ConfigError(format!(
                "unknown category policy {:?}, expected \"error\" or \"ignore\"",
                other
            ))),
        }
    }
}

/// Sorted distinct values of one categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub column: String,
    pub categories: Vec<String>,
}

impl Vocabulary {
    /// Index of `value` in the vocabulary.
    ///
    /// Exact matches win. Otherwise a single entry equal to the trimmed value
    /// ignoring ASCII case is accepted; an ambiguous or absent match is `None`.
    pub fn resolve(&self, value: &str) -> Option<usize> {
        if let Ok(idx) = self.categories.binary_search_by(|c| c.as_str().cmp(value)) {
            return Some(idx);
        }

        let needle = value.trim();
        let mut hits = self
            .categories
            .iter()
            .enumerate()
            .filter(|(_, c)| c.trim().eq_ignore_ascii_case(needle));

        match (hits.next(), hits.next()) {
            (Some((idx, _)), None) => Some(idx),
            _ => None,
        }
    }
}

/// One-hot encoder producing one indicator column per learned category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    policy: UnknownCategoryPolicy,
    vocabularies: Vec<Vocabulary>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create a new encoder
    pub fn new(policy: UnknownCategoryPolicy) -> Self {
        Self {
            policy,
            vocabularies: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn the sorted vocabulary of each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.vocabularies = columns
            .iter()
            .map(|name| {
                let categories: BTreeSet<String> = categorical_values(df, name)?.into_iter().collect();
                Ok(Vocabulary {
                    column: name.clone(),
                    categories: categories.into_iter().collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Expand the fitted columns into indicator blocks, in fit order
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PriceError::ModelNotFitted);
        }

        let mut out = Array2::zeros((df.height(), self.n_features_out()));
        let mut offset = 0;

        for vocab in &self.vocabularies {
            let values = categorical_values(df, &vocab.column)?;
            for (row, value) in values.iter().enumerate() {
                match vocab.resolve(value) {
                    Some(idx) => out[[row, offset + idx]] = 1.0,
                    None => match self.policy {
                        UnknownCategoryPolicy::Error => {
                            return Err(PriceError::UnknownCategory {
                                column: vocab.column.clone(),
                                value: value.clone(),
                            });
                        }
                        UnknownCategoryPolicy::Ignore => {
                            warn!(column = %vocab.column, value = %value, "Unknown category encoded as zeros");
                        }
                    },
                }
            }
            offset += vocab.categories.len();
        }

        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Total number of indicator columns
    pub fn n_features_out(&self) -> usize {
        self.vocabularies.iter().map(|v| v.categories.len()).sum()
    }

    /// Indicator column names, `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flat_map(|v| v.categories.iter().map(move |c| format!("{}_{}", v.column, c)))
            .collect()
    }

    pub fn vocabularies(&self) -> &[Vocabulary] {
        &self.vocabularies
    }
}

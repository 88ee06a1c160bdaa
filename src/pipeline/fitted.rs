//! Transformer and forest fitted together on one historical table

use crate::config::ModelSettings;
use crate::data::{read_dataset, split_features_target, CarQuery, FeatureLayout};
use crate::error::{PriceError, Result};
use crate::preprocessing::{ColumnTransformer, ScalerParams, UnknownCategoryPolicy, Vocabulary};
use crate::training::RandomForestRegressor;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Share of the forest's split gain attributed to one input column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnImportance {
    pub column: String,
    pub importance: f64,
}

/// What was fitted, from what, and when
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub rows: usize,
    /// Width of the transformed matrix
    pub n_features_out: usize,
    pub n_estimators: usize,
    pub random_state: u64,
    pub unknown_category: UnknownCategoryPolicy,
    /// Mean and scale learned per numerical column
    pub scaling: Vec<ScalerParams>,
    pub vocabularies: Vec<Vocabulary>,
    /// Input columns not used by the model
    pub dropped_columns: Vec<String>,
    /// Sorted by importance, highest first
    pub importances: Vec<ColumnImportance>,
    pub fitted_at: DateTime<Utc>,
    pub fit_millis: u64,
    pub source: Option<PathBuf>,
    /// SHA-256 of the source file
    pub fingerprint: Option<String>,
}

/// A [`ColumnTransformer`] feeding a [`RandomForestRegressor`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    transformer: ColumnTransformer,
    forest: RandomForestRegressor,
    summary: ModelSummary,
}

impl FittedPipeline {
    /// Fit on a table holding the nine input columns and the price
    pub fn fit(df: &DataFrame, settings: &ModelSettings) -> Result<Self> {
        let start = Instant::now();
        let layout = FeatureLayout::standard();

        let split = split_features_target(df, &layout)?;
        if split.target.is_empty() {
            return Err(PriceError::DataError("dataset has no rows".to_string()));
        }

        let mut transformer = ColumnTransformer::new(layout.clone(), settings.unknown_category);
        let x = transformer.fit_transform(&split.features)?;

        let mut forest = RandomForestRegressor::new(settings.n_estimators)
            .with_random_state(settings.random_state);
        forest.fit(&x, &split.target)?;
        debug!(
            max_depth = forest.trees().iter().map(|t| t.get_depth()).max().unwrap_or(0),
            leaves = forest.trees().iter().map(|t| t.get_n_leaves()).sum::<usize>(),
            "Forest grown"
        );

        let importances = forest
            .feature_importances()
            .map(|imp| aggregate_importances(&transformer.source_columns(), imp))
            .unwrap_or_default();

        let fit_millis = start.elapsed().as_millis() as u64;
        let summary = ModelSummary {
            rows: split.target.len(),
            n_features_out: transformer.n_features_out(),
            n_estimators: forest.n_trees(),
            random_state: settings.random_state,
            unknown_category: settings.unknown_category,
            scaling: transformer.scaler_params().to_vec(),
            vocabularies: transformer.vocabularies().to_vec(),
            dropped_columns: layout.dropped_columns().into_iter().map(String::from).collect(),
            importances,
            fitted_at: Utc::now(),
            fit_millis,
            source: None,
            fingerprint: None,
        };

        info!(
            rows = summary.rows,
            features = summary.n_features_out,
            trees = summary.n_estimators,
            fit_ms = fit_millis,
            "Pipeline fitted"
        );

        Ok(Self { transformer, forest, summary })
    }

    /// Load `path`, fit, and record the file's fingerprint
    pub fn from_path(path: &Path, settings: &ModelSettings) -> Result<Self> {
        let loaded = read_dataset(path)?;
        let mut pipeline = Self::fit(&loaded.frame, settings)?;
        pipeline.summary.source = Some(path.to_path_buf());
        pipeline.summary.fingerprint = Some(loaded.fingerprint);
        Ok(pipeline)
    }

    /// Estimated price for one query
    pub fn predict(&self, query: &CarQuery) -> Result<f64> {
        let frame = query.to_frame()?;
        let prices = self.predict_frame(&frame)?;
        let price = prices
            .first()
            .copied()
            .ok_or_else(|| PriceError::ComputationError("empty prediction".to_string()))?;

        debug!(city = %query.city, year = query.year_of_manufacture, price, "Prediction");
        Ok(price)
    }

    /// Estimated price for every row of `df`
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.transformer.transform(df)?;
        self.forest.predict(&x)
    }

    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }

    pub fn transformer(&self) -> &ColumnTransformer {
        &self.transformer
    }
}

/// Sum per-output-column importances back onto their source columns
fn aggregate_importances(sources: &[&str], importances: &Array1<f64>) -> Vec<ColumnImportance> {
    let mut totals: Vec<ColumnImportance> = Vec::new();
    for (source, value) in sources.iter().zip(importances.iter()) {
        match totals.iter_mut().find(|c| c.column == *source) {
            Some(entry) => entry.importance += value,
            None => totals.push(ColumnImportance { column: source.to_string(), importance: *value }),
        }
    }
    totals.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::*;
    use ndarray::array;

    fn table() -> DataFrame {
        df!(
            CITY => &["Delhi", "Chennai", "Delhi", "Kolkata", "Chennai", "Kolkata"],
            FUEL_TYPE => &["Petrol", "Diesel", "Petrol", "Petrol", "Diesel", "CNG"],
            BODY_TYPE => &["Sedan", "SUV", "Hatchback", "Sedan", "SUV", "Hatchback"],
            TRANSMISSION_TYPE => &["Manual", "Automatic", "Manual", "Manual", "Automatic", "Manual"],
            SEATS => &[5i64, 7, 5, 5, 7, 5],
            ENGINE_DISPLACEMENT => &[1197i64, 2179, 998, 1498, 1956, 1199],
            KILOMETERS_DRIVEN => &[42000i64, 81000, 12000, 30500, 55000, 61000],
            YEAR_OF_MANUFACTURE => &[2016i64, 2014, 2020, 2018, 2017, 2013],
            PREVIOUS_OWNERS => &[1i64, 2, 0, 1, 1, 3],
            PRICE => &[550000.0, 1250000.0, 480000.0, 700000.0, 1400000.0, 260000.0]
        )
        .unwrap()
    }

    fn query() -> CarQuery {
        CarQuery {
            city: "Delhi".into(),
            fuel_type: "Petrol".into(),
            body_type: "Sedan".into(),
            transmission_type: "Manual".into(),
            seats: 5,
            engine_displacement: 1200,
            kilometers_driven: 20000,
            year_of_manufacture: 2015,
            previous_owners: 0,
        }
    }

    #[test]
    fn test_fit_and_predict() {
        let settings = ModelSettings { n_estimators: 20, ..ModelSettings::default() };
        let pipeline = FittedPipeline::fit(&table(), &settings).unwrap();

        let price = pipeline.predict(&query()).unwrap();
        assert!(price.is_finite());
        assert!((260000.0..=1400000.0).contains(&price));

        let summary = pipeline.summary();
        assert_eq!(summary.rows, 6);
        assert_eq!(summary.n_estimators, 20);
        assert_eq!(summary.dropped_columns, vec![PREVIOUS_OWNERS.to_string()]);
        let total: f64 = summary.importances.iter().map(|c| c.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(summary.importances.len(), 8);

        let seats = summary.scaling.iter().find(|p| p.column == SEATS).unwrap();
        assert!((seats.center - 34.0 / 6.0).abs() < 1e-12);
        assert_eq!(summary.scaling.len(), 4);
    }

    #[test]
    fn test_previous_owners_does_not_change_price() {
        let pipeline = FittedPipeline::fit(&table(), &ModelSettings::default()).unwrap();
        let a = pipeline.predict(&query()).unwrap();
        let b = pipeline.predict(&CarQuery { previous_owners: 3, ..query() }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_city() {
        let strict = FittedPipeline::fit(&table(), &ModelSettings::default()).unwrap();
        let mumbai = CarQuery { city: "Mumbai".into(), ..query() };
        assert!(matches!(strict.predict(&mumbai), Err(PriceError::UnknownCategory { .. })));

        let lenient_settings = ModelSettings {
            unknown_category: UnknownCategoryPolicy::Ignore,
            ..ModelSettings::default()
        };
        let lenient = FittedPipeline::fit(&table(), &lenient_settings).unwrap();
        assert!(lenient.predict(&mumbai).unwrap().is_finite());
    }

    #[test]
    fn test_empty_table() {
        let empty = table().head(Some(0));
        assert!(FittedPipeline::fit(&empty, &ModelSettings::default()).is_err());
    }

    #[test]
    fn test_aggregate_importances() {
        let sources = ["Seats", "City", "City", "Fuel_Type"];
        let agg = aggregate_importances(&sources, &array![0.1, 0.3, 0.4, 0.2]);
        assert_eq!(agg[0].column, "City");
        assert!((agg[0].importance - 0.7).abs() < 1e-12);
        assert_eq!(agg.len(), 3);
    }
}

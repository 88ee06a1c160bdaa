//! Error types for the car price estimator

use thiserror::Error;

/// Result type alias for estimator operations
pub type Result<T> = std::result::Result<T, PriceError>;

/// Main error type for loading, fitting and predicting
#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    #[error("Column not found: {0}")]
    FeatureNotFound(String),

    #[error("Column {column} has {count} missing values")]
    MissingValues { column: String, count: usize },

    #[error("Unknown category for {column}: {value:?}")]
    UnknownCategory { column: String, value: String },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl From<polars::error::PolarsError> for PriceError {
    fn from(err: polars::error::PolarsError) -> Self {
        PriceError::DataError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PriceError {
    fn from(err: ndarray::ShapeError) -> Self {
        PriceError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<calamine::Error> for PriceError {
    fn from(err: calamine::Error) -> Self {
        PriceError::DataError(format!("workbook: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PriceError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_unknown_category_display() {
        let err = PriceError::UnknownCategory {
            column: "City".to_string(),
            value: "Mumbai".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown category for City: \"Mumbai\"");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PriceError = io_err.into();
        assert!(matches!(err, PriceError::IoError(_)));
    }
}

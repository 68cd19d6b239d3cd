//! Error types for the sales_forecast crate

use forecast_math::MathError;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too few transactions, or too few rows left after feature construction.
    /// Expected for new users; the pipeline turns it into an empty result.
    #[error("Insufficient history: {0}")]
    InsufficientHistoryError(String),

    /// Malformed input reaching feature construction (e.g. unordered dates)
    #[error("Feature computation error: {0}")]
    FeatureComputationError(String),

    /// Numerical failure while fitting a model
    #[error("Training error: {0}")]
    TrainingError(String),

    /// Failure reported by the persistence collaborator
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data loading or parsing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ForecastError {
    /// Whether this is the expected "not enough data" condition
    pub fn is_insufficient_history(&self) -> bool {
        matches!(self, ForecastError::InsufficientHistoryError(_))
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => ForecastError::InsufficientHistoryError(msg),
            other => ForecastError::TrainingError(other.to_string()),
        }
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::DataError(err.to_string())
    }
}

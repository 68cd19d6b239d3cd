//! # Forecast Math
//!
//! Numeric building blocks for daily forecasting.
//! This crate provides the regression capability used by the forecasting
//! pipeline (fit/predict over a numeric feature matrix), a closed-form
//! linear trend, polynomial term expansion and trailing-window means.

use thiserror::Error;

pub mod moving_averages;
pub mod regression;

pub use crate::regression::{FittedRegressor, LinearTrend, OlsRegressor, Regressor};

/// Errors that can occur in forecasting math
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MathError::DimensionMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 3, got 2");

        let err = MathError::InsufficientData("need 2 points".to_string());
        assert!(err.to_string().contains("need 2 points"));
    }
}

//! Forecasting models for the daily sales series

use crate::error::ForecastError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod linear;
pub mod polynomial;
pub mod seasonal;

pub use linear::{ModelTrainer, TrainedModel, TrainingOutcome};
pub use polynomial::{PolynomialTrend, PolynomialTrendFit};
pub use seasonal::{SeasonalProfile, SimpleSeasonalFallback};

/// Forecast for one future day, before profit projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Predicted sales, floored at zero
    pub predicted_sales: f64,
    /// Predicted units, floored at zero and truncated
    pub predicted_quantity: u64,
    /// Lower edge of the band, floored at zero
    pub confidence_lower: f64,
    pub confidence_upper: f64,
}

impl DailyForecast {
    /// Build a forecast row from raw model outputs and a constant band half-width
    pub fn from_raw(date: NaiveDate, raw_sales: f64, raw_quantity: f64, half_width: f64) -> Self {
        let predicted_sales = raw_sales.max(0.0);
        Self {
            date,
            predicted_sales,
            predicted_quantity: raw_quantity.max(0.0).trunc() as u64,
            confidence_lower: (predicted_sales - half_width).max(0.0),
            confidence_upper: predicted_sales + half_width,
        }
    }
}

/// Which forecasting path to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Regression on calendar, lag and rolling features with a recursive rollout
    Linear,
    /// Weekday seasonal average blended with a linear trend
    Simple,
}

impl ModelType {
    /// Label reported in forecast results
    pub fn result_label(&self) -> &'static str {
        match self {
            ModelType::Linear => "linear_regression",
            ModelType::Simple => "simple_seasonal",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::Linear => write!(f, "linear"),
            ModelType::Simple => write!(f, "simple"),
        }
    }
}

impl FromStr for ModelType {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(ModelType::Linear),
            "simple" => Ok(ModelType::Simple),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown model type: {}",
                other
            ))),
        }
    }
}

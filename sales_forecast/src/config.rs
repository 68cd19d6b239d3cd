//! Forecasting configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Lag offsets (in rows) used for sales and quantity lag features
pub const DEFAULT_LAG_OFFSETS: [usize; 6] = [1, 2, 3, 7, 14, 30];

/// Trailing windows (in rows) used for rolling sales means
pub const DEFAULT_ROLLING_WINDOWS: [usize; 2] = [7, 30];

/// Tunable parameters of a forecasting run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// History window in months of 30 days; `None` uses all history
    pub lookback_months: Option<u32>,
    /// Minimum individual transactions required before forecasting
    pub min_transactions: usize,
    /// Minimum feature rows required after lag construction
    pub min_training_rows: usize,
    /// Share of feature rows (by chronological order) used for fitting
    pub train_ratio: f64,
    /// Lag offsets for sales and quantity
    pub lag_offsets: Vec<usize>,
    /// Rolling mean windows for sales
    pub rolling_windows: Vec<usize>,
    /// Profit margin assumed on predicted sales
    pub profit_margin: f64,
    /// Default number of days to forecast
    pub horizon_days: usize,
    /// Whether `full_forecast` hands the result to the repository
    pub persist: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_months: Some(12),
            min_transactions: 30,
            min_training_rows: 20,
            train_ratio: 0.8,
            lag_offsets: DEFAULT_LAG_OFFSETS.to_vec(),
            rolling_windows: DEFAULT_ROLLING_WINDOWS.to_vec(),
            profit_margin: 0.30,
            horizon_days: 30,
            persist: true,
        }
    }
}

impl ForecastConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: ForecastConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Lookback window length in days, if one is configured
    pub fn lookback_days(&self) -> Option<i64> {
        self.lookback_months.map(|months| 30 * i64::from(months))
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "train_ratio must be between 0 and 1, got {}",
                self.train_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.profit_margin) {
            return Err(ForecastError::InvalidParameter(format!(
                "profit_margin must be between 0 and 1, got {}",
                self.profit_margin
            )));
        }
        if self.lag_offsets.is_empty() || self.lag_offsets.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "lag_offsets must be non-empty and strictly positive".to_string(),
            ));
        }
        if self.rolling_windows.is_empty() || self.rolling_windows.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "rolling_windows must be non-empty and strictly positive".to_string(),
            ));
        }
        if self.min_transactions == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_transactions must be positive".to_string(),
            ));
        }
        if self.horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

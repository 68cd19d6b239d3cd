//! Feature engineering for the daily sales series
//!
//! Each row combines features that depend only on the date (calendar fields
//! and their cyclical encodings) with features that look back along the
//! series by row offset: lags of sales and quantity, trailing sales means
//! and the day-over-day sales difference. The same column layout is used
//! for training rows and for rows assembled during the forecast rollout,
//! see [`FeatureBuilder::assemble`].

use crate::config::ForecastConfig;
use crate::data::DailyAggregate;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use forecast_math::moving_averages::rolling_mean;
use std::f64::consts::PI;
use tracing::debug;

/// Names of the date-derived features, in column order
pub const CALENDAR_FEATURES: [&str; 11] = [
    "day",
    "month",
    "year",
    "dayofweek",
    "quarter",
    "dayofyear",
    "weekend",
    "month_sin",
    "month_cos",
    "day_sin",
    "day_cos",
];

/// Calendar and cyclical features for `date`, ordered as [`CALENDAR_FEATURES`].
///
/// Day of week counts from Monday = 0.
pub fn calendar_features(date: NaiveDate) -> [f64; 11] {
    let month = f64::from(date.month());
    let dayofweek = f64::from(date.weekday().num_days_from_monday());
    let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);

    [
        f64::from(date.day()),
        month,
        f64::from(date.year()),
        dayofweek,
        f64::from((date.month() - 1) / 3 + 1),
        f64::from(date.ordinal()),
        if weekend { 1.0 } else { 0.0 },
        (2.0 * PI * month / 12.0).sin(),
        (2.0 * PI * month / 12.0).cos(),
        (2.0 * PI * dayofweek / 7.0).sin(),
        (2.0 * PI * dayofweek / 7.0).cos(),
    ]
}

/// Series-dependent inputs of one feature row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInputs {
    /// One trailing sales mean per configured window
    pub rolling_means: Vec<f64>,
    /// Sales difference to the previous day
    pub trend: f64,
    /// One sales value per configured lag offset
    pub sales_lags: Vec<f64>,
    /// One quantity value per configured lag offset
    pub quantity_lags: Vec<f64>,
}

/// One usable training row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Training rows in chronological order with their targets
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    names: Vec<String>,
    rows: Vec<FeatureRow>,
    sales: Vec<f64>,
    quantity: Vec<f64>,
}

impl FeatureMatrix {
    /// Ordered feature names
    pub fn feature_names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Feature values of every row, in row order
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|row| row.values.clone()).collect()
    }

    pub fn sales_targets(&self) -> &[f64] {
        &self.sales
    }

    pub fn quantity_targets(&self) -> &[f64] {
        &self.quantity
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a feature of row `index` by name
    pub fn value(&self, index: usize, name: &str) -> Option<f64> {
        let column = self.names.iter().position(|n| n == name)?;
        self.rows.get(index).map(|row| row.values[column])
    }
}

/// Builds feature rows from a daily series
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    lag_offsets: Vec<usize>,
    rolling_windows: Vec<usize>,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        let config = ForecastConfig::default();
        Self {
            lag_offsets: config.lag_offsets,
            rolling_windows: config.rolling_windows,
        }
    }
}

impl FeatureBuilder {
    /// Create a builder with explicit lag offsets and rolling windows
    pub fn new(lag_offsets: Vec<usize>, rolling_windows: Vec<usize>) -> Result<Self> {
        if lag_offsets.is_empty() || lag_offsets.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "Lag offsets must be non-empty and strictly positive".to_string(),
            ));
        }
        if rolling_windows.is_empty() || rolling_windows.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "Rolling windows must be non-empty and strictly positive".to_string(),
            ));
        }

        Ok(Self {
            lag_offsets,
            rolling_windows,
        })
    }

    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Self::new(config.lag_offsets.clone(), config.rolling_windows.clone())
    }

    pub fn lag_offsets(&self) -> &[usize] {
        &self.lag_offsets
    }

    pub fn rolling_windows(&self) -> &[usize] {
        &self.rolling_windows
    }

    /// Largest lag offset; rows earlier than this cannot be used for training
    pub fn max_lag(&self) -> usize {
        self.lag_offsets.iter().copied().max().unwrap_or(0)
    }

    /// Ordered feature names matching [`FeatureBuilder::assemble`]
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = CALENDAR_FEATURES.iter().map(|s| s.to_string()).collect();
        for window in &self.rolling_windows {
            names.push(format!("sales_ma_{}", window));
        }
        names.push("sales_trend".to_string());
        for lag in &self.lag_offsets {
            names.push(format!("sales_lag_{}", lag));
            names.push(format!("quantity_lag_{}", lag));
        }
        names
    }

    /// Assemble the feature values for `date` in column order
    pub fn assemble(&self, date: NaiveDate, inputs: &FeatureInputs) -> Result<Vec<f64>> {
        if inputs.rolling_means.len() != self.rolling_windows.len() {
            return Err(ForecastError::FeatureComputationError(format!(
                "Expected {} rolling means, got {}",
                self.rolling_windows.len(),
                inputs.rolling_means.len()
            )));
        }
        if inputs.sales_lags.len() != self.lag_offsets.len()
            || inputs.quantity_lags.len() != self.lag_offsets.len()
        {
            return Err(ForecastError::FeatureComputationError(format!(
                "Expected {} sales and quantity lags, got {} and {}",
                self.lag_offsets.len(),
                inputs.sales_lags.len(),
                inputs.quantity_lags.len()
            )));
        }

        let mut values = Vec::with_capacity(
            CALENDAR_FEATURES.len() + self.rolling_windows.len() + 1 + 2 * self.lag_offsets.len(),
        );
        values.extend_from_slice(&calendar_features(date));
        values.extend_from_slice(&inputs.rolling_means);
        values.push(inputs.trend);
        for (sales, quantity) in inputs.sales_lags.iter().zip(inputs.quantity_lags.iter()) {
            values.push(*sales);
            values.push(*quantity);
        }
        Ok(values)
    }

    /// Build the training matrix.
    ///
    /// Rows whose lags or trend would reach before the start of the series
    /// are dropped, never zero-filled. Rolling means tolerate partial windows
    /// and never cause a row to be dropped.
    pub fn build(&self, daily: &[DailyAggregate]) -> Result<FeatureMatrix> {
        for pair in daily.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::FeatureComputationError(format!(
                    "Daily series must be strictly increasing, found {} after {}",
                    pair[1].date, pair[0].date
                )));
            }
        }
        if let Some(bad) = daily.iter().find(|d| !d.total_sales.is_finite()) {
            return Err(ForecastError::FeatureComputationError(format!(
                "Non-finite daily sales on {}",
                bad.date
            )));
        }

        let sales: Vec<f64> = daily.iter().map(|d| d.total_sales).collect();
        let quantity: Vec<f64> = daily.iter().map(|d| d.total_quantity as f64).collect();

        let rolling: Vec<Vec<f64>> = self
            .rolling_windows
            .iter()
            .map(|&window| {
                rolling_mean(&sales, window)
                    .map_err(|e| ForecastError::FeatureComputationError(e.to_string()))
            })
            .collect::<Result<_>>()?;

        let mut rows = Vec::new();
        let mut sales_targets = Vec::new();
        let mut quantity_targets = Vec::new();

        for (i, day) in daily.iter().enumerate() {
            let lags_defined = self.lag_offsets.iter().all(|&lag| i >= lag);
            if i == 0 || !lags_defined {
                continue;
            }

            let inputs = FeatureInputs {
                rolling_means: rolling.iter().map(|means| means[i]).collect(),
                trend: sales[i] - sales[i - 1],
                sales_lags: self.lag_offsets.iter().map(|&lag| sales[i - lag]).collect(),
                quantity_lags: self.lag_offsets.iter().map(|&lag| quantity[i - lag]).collect(),
            };

            rows.push(FeatureRow {
                date: day.date,
                values: self.assemble(day.date, &inputs)?,
            });
            sales_targets.push(sales[i]);
            quantity_targets.push(quantity[i]);
        }

        debug!(
            days = daily.len(),
            usable_rows = rows.len(),
            max_lag = self.max_lag(),
            "Built feature matrix"
        );

        Ok(FeatureMatrix {
            names: self.feature_names(),
            rows,
            sales: sales_targets,
            quantity: quantity_targets,
        })
    }
}

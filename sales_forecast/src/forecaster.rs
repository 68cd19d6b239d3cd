//! Recursive multi-day rollout of a trained feature model
//!
//! Days are produced strictly in order. Lag, rolling and trend inputs of a
//! future day are read from a two-part buffer: a fixed window of real history
//! followed by the forecasts generated so far. For day `i` and lag offset `k`
//! the value sits at position `len(history) + i - k` of that combined
//! sequence, so once `i >= k` the lag is the model's own earlier prediction
//! and forecast errors feed forward into later days.
//!
//! Positions before the start of the available history read as `0.0`.
//! Rolling means come from the real history window while `i` is smaller than
//! the window size and from the trailing forecasts afterwards; the two are
//! never mixed inside one window.

use crate::data::DailyAggregate;
use crate::error::{ForecastError, Result};
use crate::features::{FeatureBuilder, FeatureInputs};
use crate::models::{DailyForecast, TrainedModel};
use chrono::Duration;
use forecast_math::moving_averages::trailing_mean;
use forecast_math::FittedRegressor;
use tracing::{debug, trace};

/// Real history followed by a growing run of forecasts, for one series
#[derive(Debug, Clone)]
struct RolloutBuffer {
    history: Vec<f64>,
    forecasts: Vec<f64>,
}

impl RolloutBuffer {
    fn new(history: Vec<f64>, horizon: usize) -> Self {
        Self {
            history,
            forecasts: Vec::with_capacity(horizon),
        }
    }

    /// Value `offset` positions before forecast step `step`
    fn lag(&self, step: usize, offset: usize) -> f64 {
        if offset <= step {
            return self.forecasts[step - offset];
        }
        let back = offset - step;
        if back <= self.history.len() {
            self.history[self.history.len() - back]
        } else {
            0.0
        }
    }

    fn rolling_mean(&self, step: usize, window: usize) -> f64 {
        if step < window {
            trailing_mean(&self.history, window).unwrap_or(0.0)
        } else {
            let recent = &self.forecasts[step - window..step];
            recent.iter().sum::<f64>() / recent.len() as f64
        }
    }

    fn push(&mut self, value: f64) {
        self.forecasts.push(value);
    }
}

/// Generates future days from a trained model pair
#[derive(Debug)]
pub struct Forecaster<'a, F> {
    model: &'a TrainedModel<F>,
    features: &'a FeatureBuilder,
    band_half_width: f64,
}

impl<'a, F: FittedRegressor> Forecaster<'a, F> {
    /// Create a forecaster.
    ///
    /// `sales_mae` is the validation MAE of the sales model and becomes the
    /// constant half-width of every day's band.
    pub fn new(
        model: &'a TrainedModel<F>,
        features: &'a FeatureBuilder,
        sales_mae: f64,
    ) -> Result<Self> {
        if model.feature_names() != features.feature_names().as_slice() {
            return Err(ForecastError::FeatureComputationError(
                "Model was trained on a different feature layout".to_string(),
            ));
        }
        if !sales_mae.is_finite() || sales_mae < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Band width must be finite and non-negative, got {}",
                sales_mae
            )));
        }

        Ok(Self {
            model,
            features,
            band_half_width: sales_mae,
        })
    }

    /// Number of trailing history rows the rollout reads
    pub fn history_window(&self) -> usize {
        let max_window = self.features.rolling_windows().iter().copied().max().unwrap_or(0);
        self.features.max_lag().max(max_window)
    }

    /// Forecast the `horizon` days following the last day of `history`
    pub fn forecast(&self, history: &[DailyAggregate], horizon: usize) -> Result<Vec<DailyForecast>> {
        let last = history.last().ok_or_else(|| {
            ForecastError::InsufficientHistoryError("Cannot forecast from an empty history".to_string())
        })?;
        for pair in history.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::FeatureComputationError(format!(
                    "Daily series must be strictly increasing, found {} after {}",
                    pair[1].date, pair[0].date
                )));
            }
        }

        let start = history.len().saturating_sub(self.history_window());
        let window = &history[start..];
        let mut sales = RolloutBuffer::new(window.iter().map(|d| d.total_sales).collect(), horizon);
        let mut quantity = RolloutBuffer::new(
            window.iter().map(|d| d.total_quantity as f64).collect(),
            horizon,
        );

        let lags = self.features.lag_offsets();
        let windows = self.features.rolling_windows();
        let mut output = Vec::with_capacity(horizon);

        for step in 0..horizon {
            let date = last.date + Duration::days(step as i64 + 1);

            let inputs = FeatureInputs {
                rolling_means: windows.iter().map(|&w| sales.rolling_mean(step, w)).collect(),
                trend: sales.lag(step, 1) - sales.lag(step, 2),
                sales_lags: lags.iter().map(|&k| sales.lag(step, k)).collect(),
                quantity_lags: lags.iter().map(|&k| quantity.lag(step, k)).collect(),
            };

            let row = self.features.assemble(date, &inputs)?;
            let (raw_sales, raw_quantity) = self.model.predict(&row)?;
            let day = DailyForecast::from_raw(date, raw_sales, raw_quantity, self.band_half_width);

            trace!(
                step = step,
                %date,
                predicted_sales = day.predicted_sales,
                predicted_quantity = day.predicted_quantity,
                "Rollout step"
            );

            sales.push(day.predicted_sales);
            quantity.push(day.predicted_quantity as f64);
            output.push(day);
        }

        debug!(
            horizon = horizon,
            history_rows = window.len(),
            "Completed recursive rollout"
        );

        Ok(output)
    }
}

//! Seasonal-average fallback model
//!
//! Each future day is the plain average of two components: the historical
//! mean sales of its weekday and a linear trend over the whole history
//! extrapolated to that day. The band is plus/minus the historical standard
//! deviation of daily sales. There is no fitting step that can fail
//! numerically, so a non-empty history always produces a forecast.

use crate::data::DailyAggregate;
use crate::error::{ForecastError, Result};
use crate::models::DailyForecast;
use chrono::{Datelike, Duration, NaiveDate};
use forecast_math::LinearTrend;
use statrs::statistics::Statistics;
use tracing::debug;

/// The fallback model
#[derive(Debug, Clone, Default)]
pub struct SimpleSeasonalFallback;

/// Statistics the fallback derives from history
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalProfile {
    last_date: NaiveDate,
    history_len: usize,
    /// Mean sales per weekday, Monday first; `None` for weekdays never seen
    weekday_means: [Option<f64>; 7],
    overall_mean: f64,
    mean_quantity: f64,
    std_dev: f64,
    trend: LinearTrend,
}

impl SimpleSeasonalFallback {
    pub fn new() -> Self {
        Self
    }

    /// Derive the weekday profile, overall statistics and trend
    pub fn fit(&self, history: &[DailyAggregate]) -> Result<SeasonalProfile> {
        let last = history.last().ok_or_else(|| {
            ForecastError::InsufficientHistoryError(
                "Seasonal fallback needs at least one day of history".to_string(),
            )
        })?;

        let sales: Vec<f64> = history.iter().map(|d| d.total_sales).collect();
        let quantities: Vec<f64> = history.iter().map(|d| d.total_quantity as f64).collect();

        let mut buckets: [Vec<f64>; 7] = Default::default();
        for day in history {
            let weekday = day.date.weekday().num_days_from_monday() as usize;
            buckets[weekday].push(day.total_sales);
        }
        let weekday_means = buckets.map(|bucket| {
            if bucket.is_empty() {
                None
            } else {
                Some(bucket.iter().mean())
            }
        });

        // Sample standard deviation is undefined for a single day
        let std_dev = if sales.len() > 1 {
            sales.iter().std_dev()
        } else {
            0.0
        };

        let profile = SeasonalProfile {
            last_date: last.date,
            history_len: history.len(),
            weekday_means,
            overall_mean: sales.iter().mean(),
            mean_quantity: quantities.iter().mean(),
            std_dev,
            trend: LinearTrend::fit(&sales)?,
        };

        debug!(
            days = profile.history_len,
            overall_mean = profile.overall_mean,
            slope = profile.trend.slope,
            std_dev = profile.std_dev,
            "Fitted seasonal fallback"
        );

        Ok(profile)
    }
}

impl SeasonalProfile {
    pub fn overall_mean(&self) -> f64 {
        self.overall_mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn trend(&self) -> &LinearTrend {
        &self.trend
    }

    /// Mean sales for a weekday (Monday = 0), falling back to the overall mean
    pub fn weekday_mean(&self, weekday: usize) -> f64 {
        self.weekday_means
            .get(weekday)
            .copied()
            .flatten()
            .unwrap_or(self.overall_mean)
    }

    /// Forecast the `horizon` days after the last historical date
    pub fn forecast(&self, horizon: usize) -> Vec<DailyForecast> {
        (0..horizon)
            .map(|i| {
                let date = self.last_date + Duration::days(i as i64 + 1);
                let seasonal = self.weekday_mean(date.weekday().num_days_from_monday() as usize);
                let trend = self.trend.value_at((self.history_len + i) as f64);
                let sales = (seasonal + trend) / 2.0;

                let quantity = if self.overall_mean != 0.0 {
                    sales.max(0.0) / self.overall_mean * self.mean_quantity
                } else {
                    0.0
                };

                DailyForecast::from_raw(date, sales, quantity, self.std_dev)
            })
            .collect()
    }
}

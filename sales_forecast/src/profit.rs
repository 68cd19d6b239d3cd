//! Profit projection from sales forecasts
//!
//! There is no cost data, so profit is sales times a caller-supplied margin.

use crate::error::{ForecastError, Result};
use crate::models::DailyForecast;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default margin assumed on predicted sales
pub const DEFAULT_PROFIT_MARGIN: f64 = 0.30;

/// One forecast day with its profit projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_sales: f64,
    pub predicted_quantity: u64,
    /// Lower edge of the sales band
    pub confidence_lower: f64,
    /// Upper edge of the sales band
    pub confidence_upper: f64,
    /// `predicted_sales * profit_margin`
    pub predicted_profit: f64,
    /// Margin as a ratio (0.30 for 30%)
    pub profit_margin: f64,
    /// Sales band scaled by the margin
    pub profit_lower: f64,
    pub profit_upper: f64,
}

/// Profit-projected forecast with horizon totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitProjection {
    pub points: Vec<ForecastPoint>,
    pub total_sales: f64,
    pub total_profit: f64,
    pub avg_daily_sales: f64,
    pub avg_daily_profit: f64,
}

/// Applies a margin assumption to sales forecasts
#[derive(Debug, Clone, Copy)]
pub struct ProfitProjector {
    margin: f64,
}

impl Default for ProfitProjector {
    fn default() -> Self {
        Self {
            margin: DEFAULT_PROFIT_MARGIN,
        }
    }
}

impl ProfitProjector {
    /// Create a projector with a margin between 0 and 1
    pub fn new(margin: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&margin) {
            return Err(ForecastError::InvalidParameter(format!(
                "Profit margin must be between 0 and 1, got {}",
                margin
            )));
        }
        Ok(Self { margin })
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Project profit for every day and aggregate over the horizon
    pub fn project(&self, forecasts: &[DailyForecast]) -> Result<ProfitProjection> {
        if forecasts.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Cannot project profit for an empty forecast".to_string(),
            ));
        }

        let points: Vec<ForecastPoint> = forecasts
            .iter()
            .map(|day| ForecastPoint {
                date: day.date,
                predicted_sales: day.predicted_sales,
                predicted_quantity: day.predicted_quantity,
                confidence_lower: day.confidence_lower,
                confidence_upper: day.confidence_upper,
                predicted_profit: day.predicted_sales * self.margin,
                profit_margin: self.margin,
                profit_lower: day.confidence_lower * self.margin,
                profit_upper: day.confidence_upper * self.margin,
            })
            .collect();

        let total_sales: f64 = points.iter().map(|p| p.predicted_sales).sum();
        let total_profit: f64 = points.iter().map(|p| p.predicted_profit).sum();
        let days = points.len() as f64;

        Ok(ProfitProjection {
            total_sales,
            total_profit,
            avg_daily_sales: total_sales / days,
            avg_daily_profit: total_profit / days,
            points,
        })
    }
}

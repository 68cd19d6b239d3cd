//! Forecast results and their summary

use crate::metrics::AccuracyMetrics;
use crate::profit::{ForecastPoint, ProfitProjection};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How much the forecast can be trusted, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Backed by validation metrics
    Moderate,
    /// Heuristic model without a validation step
    Estimated,
}

/// A single notable day of the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySales {
    pub date: NaiveDate,
    pub predicted_sales: f64,
}

/// Headline accuracy figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAccuracySummary {
    pub r2: f64,
    pub mae: f64,
}

/// Aggregate view of a forecast horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_predicted_sales: f64,
    pub total_predicted_profit: f64,
    pub avg_daily_sales: f64,
    pub avg_daily_profit: f64,
    pub peak_day: DaySales,
    pub lowest_day: DaySales,
    pub total_days: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub confidence_level: ConfidenceLevel,
    pub model_accuracy: Option<ModelAccuracySummary>,
}

impl ForecastSummary {
    /// Summarise a projection. Returns `None` for an empty projection.
    pub fn from_projection(
        projection: &ProfitProjection,
        accuracy: Option<&AccuracyMetrics>,
    ) -> Option<Self> {
        let first = projection.points.first()?;
        let last = projection.points.last()?;

        // Earliest day wins ties
        let mut peak = first;
        let mut lowest = first;
        for point in &projection.points[1..] {
            if point.predicted_sales > peak.predicted_sales {
                peak = point;
            }
            if point.predicted_sales < lowest.predicted_sales {
                lowest = point;
            }
        }

        Some(Self {
            total_predicted_sales: projection.total_sales,
            total_predicted_profit: projection.total_profit,
            avg_daily_sales: projection.avg_daily_sales,
            avg_daily_profit: projection.avg_daily_profit,
            peak_day: DaySales {
                date: peak.date,
                predicted_sales: peak.predicted_sales,
            },
            lowest_day: DaySales {
                date: lowest.date,
                predicted_sales: lowest.predicted_sales,
            },
            total_days: projection.points.len(),
            start_date: first.date,
            end_date: last.date,
            confidence_level: if accuracy.is_some() {
                ConfidenceLevel::Moderate
            } else {
                ConfidenceLevel::Estimated
            },
            model_accuracy: accuracy.map(|a| ModelAccuracySummary {
                r2: a.sales.r2,
                mae: a.sales.mae,
            }),
        })
    }
}

/// Output of one forecasting invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predictions: Vec<ForecastPoint>,
    pub summary: ForecastSummary,
    /// Validation metrics; absent for the seasonal fallback
    pub accuracy: Option<AccuracyMetrics>,
    pub model_type: String,
    pub generated_at: DateTime<Utc>,
}

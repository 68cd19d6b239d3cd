//! Polynomial trend of sales against day index
//!
//! A comparison model: no calendar or lag features, only powers of the row
//! index, fitted with the same regressor and chronological split as the
//! feature model.

use crate::data::DailyAggregate;
use crate::error::{ForecastError, Result};
use crate::metrics::{mean_absolute_error, mean_squared_error, r2_score};
use chrono::{Duration, NaiveDate};
use forecast_math::regression::{polynomial_terms, FittedOls};
use forecast_math::{FittedRegressor, OlsRegressor, Regressor};
use serde::{Deserialize, Serialize};

/// Polynomial trend model
#[derive(Debug, Clone)]
pub struct PolynomialTrend {
    degree: usize,
    train_ratio: f64,
}

/// Validation accuracy of a polynomial trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAccuracy {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// A fitted polynomial trend
#[derive(Debug, Clone)]
pub struct PolynomialTrendFit {
    degree: usize,
    fitted: FittedOls,
    accuracy: TrendAccuracy,
    history_len: usize,
    last_date: NaiveDate,
}

impl Default for PolynomialTrend {
    fn default() -> Self {
        Self {
            degree: 2,
            train_ratio: 0.8,
        }
    }
}

impl PolynomialTrend {
    /// Create a polynomial trend of the given degree
    pub fn new(degree: usize, train_ratio: f64) -> Result<Self> {
        if degree == 0 {
            return Err(ForecastError::InvalidParameter(
                "Polynomial degree must be at least 1".to_string(),
            ));
        }
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got {}",
                train_ratio
            )));
        }

        Ok(Self {
            degree,
            train_ratio,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Fit on the leading share of days and score on the rest
    pub fn fit(&self, history: &[DailyAggregate]) -> Result<PolynomialTrendFit> {
        let last_date = history
            .last()
            .map(|d| d.date)
            .ok_or_else(|| ForecastError::InsufficientHistoryError("Empty history".to_string()))?;

        let split = (history.len() as f64 * self.train_ratio).floor() as usize;
        if split == 0 || split == history.len() {
            return Err(ForecastError::InsufficientHistoryError(format!(
                "{} days cannot be split into training and validation sets",
                history.len()
            )));
        }

        let features: Vec<Vec<f64>> = (0..history.len())
            .map(|i| polynomial_terms(i as f64, self.degree))
            .collect();
        let sales: Vec<f64> = history.iter().map(|d| d.total_sales).collect();

        let fitted = OlsRegressor::new().fit(&features[..split], &sales[..split])?;
        let predicted = fitted.predict(&features[split..])?;
        let actual = &sales[split..];

        let accuracy = TrendAccuracy {
            mae: mean_absolute_error(actual, &predicted)?,
            rmse: mean_squared_error(actual, &predicted)?.sqrt(),
            r2: r2_score(actual, &predicted)?,
        };

        Ok(PolynomialTrendFit {
            degree: self.degree,
            fitted,
            accuracy,
            history_len: history.len(),
            last_date,
        })
    }
}

impl PolynomialTrendFit {
    pub fn accuracy(&self) -> &TrendAccuracy {
        &self.accuracy
    }

    pub fn coefficients(&self) -> &FittedOls {
        &self.fitted
    }

    /// Extrapolate the trend over the `horizon` days after the history, floored at zero
    pub fn extrapolate(&self, horizon: usize) -> Result<Vec<(NaiveDate, f64)>> {
        (0..horizon)
            .map(|i| -> Result<(NaiveDate, f64)> {
                let x = (self.history_len + i) as f64;
                let value = self
                    .fitted
                    .predict_row(&polynomial_terms(x, self.degree))?;
                Ok((self.last_date + Duration::days(i as i64 + 1), value.max(0.0)))
            })
            .collect()
    }
}

//! Regression primitives
//!
//! [`Regressor`] is the fit/predict capability the forecasting rollout is
//! written against. [`OlsRegressor`] is the default implementation:
//! ordinary least squares with an intercept, solved on centred data through
//! an SVD so that collinear feature columns (constant lags, calendar fields
//! that move together) yield the minimum-norm solution instead of failing.

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A regression algorithm that can be fitted to a numeric feature matrix
pub trait Regressor: Debug {
    /// The fitted model produced by [`Regressor::fit`]
    type Fitted: FittedRegressor;

    /// Fit against `features` (one row per observation) and `targets`
    fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<Self::Fitted>;

    /// Name of the algorithm
    fn name(&self) -> &str;
}

/// A fitted regression model
pub trait FittedRegressor: Debug {
    /// Predict the target for a single feature row
    fn predict_row(&self, row: &[f64]) -> Result<f64>;

    /// Predict the target for every row
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Number of features the model expects per row
    fn n_features(&self) -> usize;
}

/// Ordinary least squares linear regression
#[derive(Debug, Clone, Default)]
pub struct OlsRegressor;

/// Fitted ordinary least squares coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedOls {
    /// One coefficient per feature column
    pub coefficients: Vec<f64>,
    /// Intercept term
    pub intercept: f64,
}

impl OlsRegressor {
    pub fn new() -> Self {
        Self
    }
}

impl Regressor for OlsRegressor {
    type Fitted = FittedOls;

    fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<FittedOls> {
        let n = targets.len();
        if n == 0 {
            return Err(MathError::InsufficientData(
                "At least one observation is required to fit a regression".to_string(),
            ));
        }
        if features.len() != n {
            return Err(MathError::DimensionMismatch {
                expected: n,
                got: features.len(),
            });
        }

        let p = features[0].len();
        for row in features {
            if row.len() != p {
                return Err(MathError::DimensionMismatch {
                    expected: p,
                    got: row.len(),
                });
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(MathError::InvalidInput(
                    "Feature matrix contains non-finite values".to_string(),
                ));
            }
        }
        if targets.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Targets contain non-finite values".to_string(),
            ));
        }

        let target_mean = targets.iter().sum::<f64>() / n as f64;
        if p == 0 {
            return Ok(FittedOls {
                coefficients: Vec::new(),
                intercept: target_mean,
            });
        }

        let column_means: Vec<f64> = (0..p)
            .map(|j| features.iter().map(|row| row[j]).sum::<f64>() / n as f64)
            .collect();

        let x = DMatrix::from_fn(n, p, |i, j| features[i][j] - column_means[j]);
        let y = DVector::from_fn(n, |i, _| targets[i] - target_mean);

        let svd = x.svd(true, true);
        let largest = svd.singular_values.iter().cloned().fold(0.0_f64, f64::max);
        // Same cut-off numpy's lstsq uses for rank determination
        let tolerance = largest * n.max(p) as f64 * f64::EPSILON;

        let beta = svd
            .solve(&y, tolerance)
            .map_err(|e| MathError::CalculationError(format!("Least squares solve failed: {}", e)))?;

        let coefficients: Vec<f64> = beta.iter().cloned().collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(MathError::CalculationError(
                "Least squares produced non-finite coefficients".to_string(),
            ));
        }

        let intercept = target_mean
            - coefficients
                .iter()
                .zip(column_means.iter())
                .map(|(c, m)| c * m)
                .sum::<f64>();

        Ok(FittedOls {
            coefficients,
            intercept,
        })
    }

    fn name(&self) -> &str {
        "ordinary_least_squares"
    }
}

impl FittedRegressor for FittedOls {
    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(MathError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: row.len(),
            });
        }

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

/// Straight line fitted to values against their position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fit `values[i]` against `i` by least squares.
    ///
    /// A single value gives a flat line through it. Never fails for a
    /// non-empty input.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Not enough data for a trend. Need at least 1 point.".to_string(),
            ));
        }

        let n = values.len() as f64;
        let x_mean = (0..values.len()).map(|i| i as f64).sum::<f64>() / n;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let x = i as f64;
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        let slope = if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        };

        Ok(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    /// Value of the line at position `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Expand `x` into polynomial terms `[x, x^2, ..., x^degree]`.
///
/// The constant term is left out because [`OlsRegressor`] fits its own intercept.
pub fn polynomial_terms(x: f64, degree: usize) -> Vec<f64> {
    (1..=degree).map(|d| x.powi(d as i32)).collect()
}

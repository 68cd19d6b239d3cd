//! Regression training on the feature matrix
//!
//! Two independent regressors are fitted on the same features, one for daily
//! sales and one for daily quantity. Rows are split chronologically: the first
//! share of rows trains, the remaining tail validates. No shuffling.

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::features::FeatureMatrix;
use crate::metrics::{evaluate_quantity, evaluate_sales, AccuracyMetrics};
use forecast_math::{FittedRegressor, OlsRegressor, Regressor};
use tracing::debug;

/// A fitted sales/quantity model pair and the feature layout it expects
#[derive(Debug, Clone)]
pub struct TrainedModel<F> {
    feature_names: Vec<String>,
    sales_model: F,
    quantity_model: F,
}

impl<F: FittedRegressor> TrainedModel<F> {
    /// Pair two fitted models with their feature names
    pub fn new(feature_names: Vec<String>, sales_model: F, quantity_model: F) -> Result<Self> {
        for model in [&sales_model, &quantity_model] {
            if model.n_features() != feature_names.len() {
                return Err(ForecastError::TrainingError(format!(
                    "Model expects {} features but {} names were given",
                    model.n_features(),
                    feature_names.len()
                )));
            }
        }

        Ok(Self {
            feature_names,
            sales_model,
            quantity_model,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn sales_model(&self) -> &F {
        &self.sales_model
    }

    pub fn quantity_model(&self) -> &F {
        &self.quantity_model
    }

    /// Raw (unfloored) sales and quantity predictions for one feature row
    pub fn predict(&self, row: &[f64]) -> Result<(f64, f64)> {
        let sales = self.sales_model.predict_row(row)?;
        let quantity = self.quantity_model.predict_row(row)?;
        if !sales.is_finite() || !quantity.is_finite() {
            return Err(ForecastError::TrainingError(
                "Model produced a non-finite prediction".to_string(),
            ));
        }
        Ok((sales, quantity))
    }
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome<F> {
    pub model: TrainedModel<F>,
    pub accuracy: AccuracyMetrics,
    pub train_rows: usize,
    pub validation_rows: usize,
}

/// Fits the sales and quantity regressors with a chronological split
#[derive(Debug, Clone)]
pub struct ModelTrainer<R: Regressor = OlsRegressor> {
    regressor: R,
    train_ratio: f64,
    min_rows: usize,
}

impl Default for ModelTrainer<OlsRegressor> {
    fn default() -> Self {
        Self {
            regressor: OlsRegressor::new(),
            train_ratio: 0.8,
            min_rows: 20,
        }
    }
}

impl ModelTrainer<OlsRegressor> {
    /// Trainer using ordinary least squares with settings from `config`
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Self::with_regressor(
            OlsRegressor::new(),
            config.train_ratio,
            config.min_training_rows,
        )
    }
}

impl<R: Regressor> ModelTrainer<R> {
    /// Trainer using any regressor
    pub fn with_regressor(regressor: R, train_ratio: f64, min_rows: usize) -> Result<Self> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got {}",
                train_ratio
            )));
        }

        Ok(Self {
            regressor,
            train_ratio,
            min_rows,
        })
    }

    pub fn regressor(&self) -> &R {
        &self.regressor
    }

    /// Number of leading rows used for fitting out of `rows`
    pub fn split_index(&self, rows: usize) -> usize {
        (rows as f64 * self.train_ratio).floor() as usize
    }

    /// Fit both regressors and evaluate them on the held-out tail
    pub fn train(&self, matrix: &FeatureMatrix) -> Result<TrainingOutcome<R::Fitted>> {
        let rows = matrix.len();
        if rows < self.min_rows {
            return Err(ForecastError::InsufficientHistoryError(format!(
                "{} feature rows after lag construction, need at least {}",
                rows, self.min_rows
            )));
        }

        let split = self.split_index(rows);
        if split == 0 || split == rows {
            return Err(ForecastError::InsufficientHistoryError(format!(
                "{} feature rows cannot be split into training and validation sets",
                rows
            )));
        }

        let features = matrix.features();
        let (train_x, test_x) = features.split_at(split);
        let (train_sales, test_sales) = matrix.sales_targets().split_at(split);
        let (train_quantity, test_quantity) = matrix.quantity_targets().split_at(split);

        debug!(
            regressor = self.regressor.name(),
            train_rows = split,
            validation_rows = rows - split,
            features = matrix.feature_names().len(),
            "Fitting sales and quantity models"
        );

        let sales_model = self.regressor.fit(train_x, train_sales)?;
        let quantity_model = self.regressor.fit(train_x, train_quantity)?;

        let sales_pred = sales_model.predict(test_x)?;
        let quantity_pred = quantity_model.predict(test_x)?;

        let accuracy = AccuracyMetrics {
            sales: evaluate_sales(test_sales, &sales_pred)?,
            quantity: evaluate_quantity(test_quantity, &quantity_pred)?,
        };

        debug!(
            r2 = accuracy.sales.r2,
            mae = accuracy.sales.mae,
            "Validation accuracy"
        );

        Ok(TrainingOutcome {
            model: TrainedModel::new(
                matrix.feature_names().to_vec(),
                sales_model,
                quantity_model,
            )?,
            accuracy,
            train_rows: split,
            validation_rows: rows - split,
        })
    }
}

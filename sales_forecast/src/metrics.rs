//! Metrics for evaluating forecast accuracy on held-out rows

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Accuracy of the sales model on the validation rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Mean Absolute Percentage Error over non-zero actuals; `None` if all actuals are zero
    pub mape: Option<f64>,
}

/// Accuracy of the quantity model on the validation rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityAccuracy {
    pub mae: f64,
    pub rmse: f64,
}

/// Validation metrics of a trained model pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    pub sales: SalesAccuracy,
    pub quantity: QuantityAccuracy,
}

impl std::fmt::Display for AccuracyMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  Sales MAE:     {:.4}", self.sales.mae)?;
        writeln!(f, "  Sales MSE:     {:.4}", self.sales.mse)?;
        writeln!(f, "  Sales RMSE:    {:.4}", self.sales.rmse)?;
        writeln!(f, "  Sales R2:      {:.4}", self.sales.r2)?;
        match self.sales.mape {
            Some(mape) => writeln!(f, "  Sales MAPE:    {:.4}%", mape)?,
            None => writeln!(f, "  Sales MAPE:    n/a")?,
        }
        writeln!(f, "  Quantity MAE:  {:.4}", self.quantity.mae)?;
        writeln!(f, "  Quantity RMSE: {:.4}", self.quantity.rmse)?;
        Ok(())
    }
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Actual and predicted values must have the same non-zero length".to_string(),
        ));
    }
    Ok(())
}

/// Mean Absolute Error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Mean Squared Error
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Coefficient of determination.
///
/// With constant actuals the score is 1.0 for a perfect prediction and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Mean Absolute Percentage Error in percent, skipping zero actuals
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> Result<Option<f64>> {
    check_lengths(actual, predicted)?;
    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, p)| ((a - p) / a).abs())
        .collect();

    if errors.is_empty() {
        return Ok(None);
    }
    Ok(Some(errors.iter().sum::<f64>() / errors.len() as f64 * 100.0))
}

/// Evaluate sales predictions
pub fn evaluate_sales(actual: &[f64], predicted: &[f64]) -> Result<SalesAccuracy> {
    let mse = mean_squared_error(actual, predicted)?;
    Ok(SalesAccuracy {
        mae: mean_absolute_error(actual, predicted)?,
        mse,
        rmse: mse.sqrt(),
        r2: r2_score(actual, predicted)?,
        mape: mean_absolute_percentage_error(actual, predicted)?,
    })
}

/// Evaluate quantity predictions
pub fn evaluate_quantity(actual: &[f64], predicted: &[f64]) -> Result<QuantityAccuracy> {
    Ok(QuantityAccuracy {
        mae: mean_absolute_error(actual, predicted)?,
        rmse: mean_squared_error(actual, predicted)?.sqrt(),
    })
}

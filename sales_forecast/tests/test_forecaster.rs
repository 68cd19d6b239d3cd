use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use forecast_math::FittedRegressor;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sales_forecast::data::DailyAggregate;
use sales_forecast::features::FeatureBuilder;
use sales_forecast::forecaster::Forecaster;
use sales_forecast::models::{ModelTrainer, TrainedModel};
use sales_forecast::ForecastError;

// Returns one column of the row, scaled and shifted
#[derive(Debug, Clone)]
struct ColumnEcho {
    column: usize,
    scale: f64,
    offset: f64,
    n_features: usize,
}

impl FittedRegressor for ColumnEcho {
    fn predict_row(&self, row: &[f64]) -> forecast_math::Result<f64> {
        Ok(row[self.column] * self.scale + self.offset)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

fn echo(builder: &FeatureBuilder, name: &str, scale: f64, offset: f64) -> ColumnEcho {
    let names = builder.feature_names();
    ColumnEcho {
        column: names.iter().position(|n| n == name).unwrap(),
        scale,
        offset,
        n_features: names.len(),
    }
}

fn history(sales: &[f64], quantity: &[i64]) -> Vec<DailyAggregate> {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    sales
        .iter()
        .zip(quantity.iter())
        .enumerate()
        .map(|(i, (&s, &q))| DailyAggregate {
            date: start + Duration::days(i as i64),
            total_sales: s,
            total_quantity: q,
            transaction_count: 1,
        })
        .collect()
}

fn small_builder() -> FeatureBuilder {
    FeatureBuilder::new(vec![1, 2, 5], vec![2]).unwrap()
}

#[test]
fn test_predictions_feed_back_as_lags() {
    let builder = small_builder();
    let model = TrainedModel::new(
        builder.feature_names(),
        echo(&builder, "sales_lag_1", 1.0, 1.0),
        echo(&builder, "quantity_lag_2", 1.0, 0.0),
    )
    .unwrap();
    let forecaster = Forecaster::new(&model, &builder, 0.0).unwrap();

    let days = forecaster
        .forecast(&history(&[10.0, 20.0, 30.0], &[1, 2, 3]), 5)
        .unwrap();

    let sales: Vec<f64> = days.iter().map(|d| d.predicted_sales).collect();
    assert_eq!(sales, vec![31.0, 32.0, 33.0, 34.0, 35.0]);

    // Lag 2 reads history for the first two days, then earlier forecasts
    let quantity: Vec<u64> = days.iter().map(|d| d.predicted_quantity).collect();
    assert_eq!(quantity, vec![2, 3, 2, 3, 2]);
}

#[test]
fn test_lags_before_history_start_read_zero() {
    let builder = small_builder();
    let model = TrainedModel::new(
        builder.feature_names(),
        echo(&builder, "sales_lag_5", 1.0, 0.0),
        echo(&builder, "quantity_lag_1", 1.0, 0.0),
    )
    .unwrap();
    let forecaster = Forecaster::new(&model, &builder, 0.0).unwrap();

    let days = forecaster
        .forecast(&history(&[10.0, 20.0, 30.0], &[1, 1, 1]), 5)
        .unwrap();

    let sales: Vec<f64> = days.iter().map(|d| d.predicted_sales).collect();
    assert_eq!(sales, vec![0.0, 0.0, 10.0, 20.0, 30.0]);
}

#[test]
fn test_trend_uses_combined_sequence() {
    let builder = small_builder();
    let model = TrainedModel::new(
        builder.feature_names(),
        echo(&builder, "sales_trend", 1.0, 100.0),
        echo(&builder, "quantity_lag_1", 1.0, 0.0),
    )
    .unwrap();
    let forecaster = Forecaster::new(&model, &builder, 0.0).unwrap();

    let days = forecaster
        .forecast(&history(&[10.0, 20.0, 50.0], &[1, 1, 1]), 3)
        .unwrap();

    // Day 0: 50 - 20; day 1: 130 - 50; day 2: 180 - 130
    let sales: Vec<f64> = days.iter().map(|d| d.predicted_sales).collect();
    assert_eq!(sales, vec![130.0, 180.0, 150.0]);
}

#[test]
fn test_negative_predictions_are_floored() {
    let builder = small_builder();
    let model = TrainedModel::new(
        builder.feature_names(),
        echo(&builder, "sales_lag_1", -1.0, 0.0),
        echo(&builder, "quantity_lag_1", -1.0, 0.0),
    )
    .unwrap();
    let forecaster = Forecaster::new(&model, &builder, 4.0).unwrap();

    let days = forecaster
        .forecast(&history(&[10.0, 20.0, 30.0], &[1, 2, 3]), 3)
        .unwrap();

    for day in &days {
        assert_eq!(day.predicted_sales, 0.0);
        assert_eq!(day.predicted_quantity, 0);
        assert_eq!(day.confidence_lower, 0.0);
        assert_eq!(day.confidence_upper, 4.0);
    }
}

#[test]
fn test_trained_rollout_invariants() {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 150;
    let sales: Vec<f64> = (0..n)
        .map(|i| 200.0 + (i % 7) as f64 * 15.0 + i as f64 * 0.8 + rng.gen_range(-10.0..10.0))
        .collect();
    let quantity: Vec<i64> = (0..n).map(|i| 5 + (i % 7) as i64).collect();
    let daily = history(&sales, &quantity);

    let builder = FeatureBuilder::default();
    let matrix = builder.build(&daily).unwrap();
    let outcome = ModelTrainer::default().train(&matrix).unwrap();
    let mae = outcome.accuracy.sales.mae;
    let forecaster = Forecaster::new(&outcome.model, &builder, mae).unwrap();
    assert_eq!(forecaster.history_window(), 30);

    let days = forecaster.forecast(&daily, 30).unwrap();

    assert_eq!(days.len(), 30);
    let last = daily.last().unwrap().date;
    for (i, day) in days.iter().enumerate() {
        assert_eq!(day.date, last + Duration::days(i as i64 + 1));
        assert!(day.predicted_sales >= 0.0);
        assert!(day.confidence_lower >= 0.0);
        assert!(day.confidence_lower <= day.predicted_sales);
        assert!(day.predicted_sales <= day.confidence_upper);
        assert_relative_eq!(day.confidence_upper - day.predicted_sales, mae, epsilon = 1e-9);
    }
}

#[test]
fn test_layout_mismatch_is_rejected() {
    let trained_with = small_builder();
    let model = TrainedModel::new(
        trained_with.feature_names(),
        echo(&trained_with, "sales_lag_1", 1.0, 0.0),
        echo(&trained_with, "quantity_lag_1", 1.0, 0.0),
    )
    .unwrap();

    let other = FeatureBuilder::new(vec![1, 2], vec![2]).unwrap();
    let result = Forecaster::new(&model, &other, 1.0);
    assert!(matches!(result, Err(ForecastError::FeatureComputationError(_))));
}

#[test]
fn test_invalid_band_and_history() {
    let builder = small_builder();
    let model = TrainedModel::new(
        builder.feature_names(),
        echo(&builder, "sales_lag_1", 1.0, 0.0),
        echo(&builder, "quantity_lag_1", 1.0, 0.0),
    )
    .unwrap();

    assert!(matches!(
        Forecaster::new(&model, &builder, -1.0),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(Forecaster::new(&model, &builder, f64::NAN).is_err());

    let forecaster = Forecaster::new(&model, &builder, 1.0).unwrap();
    assert!(matches!(
        forecaster.forecast(&[], 3),
        Err(ForecastError::InsufficientHistoryError(_))
    ));

    let mut unordered = history(&[1.0, 2.0, 3.0], &[1, 1, 1]);
    unordered.swap(0, 2);
    assert!(matches!(
        forecaster.forecast(&unordered, 3),
        Err(ForecastError::FeatureComputationError(_))
    ));
}

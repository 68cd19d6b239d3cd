use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use sales_forecast::data::DailyAggregate;
use sales_forecast::features::{calendar_features, FeatureBuilder, FeatureInputs, CALENDAR_FEATURES};
use sales_forecast::ForecastError;
use std::f64::consts::PI;

fn series(sales: &[f64]) -> Vec<DailyAggregate> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    sales
        .iter()
        .enumerate()
        .map(|(i, &s)| DailyAggregate {
            date: start + Duration::days(i as i64),
            total_sales: s,
            total_quantity: i as i64,
            transaction_count: 1,
        })
        .collect()
}

#[test]
fn test_calendar_features_for_known_date() {
    // Saturday 15 June 2024
    let features = calendar_features(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());

    assert_eq!(features[0], 15.0); // day
    assert_eq!(features[1], 6.0); // month
    assert_eq!(features[2], 2024.0); // year
    assert_eq!(features[3], 5.0); // dayofweek, Monday = 0
    assert_eq!(features[4], 2.0); // quarter
    assert_eq!(features[5], 167.0); // dayofyear in a leap year
    assert_eq!(features[6], 1.0); // weekend
    assert_relative_eq!(features[7], (PI).sin(), epsilon = 1e-12);
    assert_relative_eq!(features[8], -1.0, epsilon = 1e-12);
    assert_relative_eq!(features[9], (2.0 * PI * 5.0 / 7.0).sin(), epsilon = 1e-12);
    assert_relative_eq!(features[10], (2.0 * PI * 5.0 / 7.0).cos(), epsilon = 1e-12);
}

#[test]
fn test_weekday_is_not_weekend() {
    // Monday 1 January 2024
    let features = calendar_features(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(features[3], 0.0);
    assert_eq!(features[4], 1.0);
    assert_eq!(features[6], 0.0);
}

#[test]
fn test_feature_name_order() {
    let builder = FeatureBuilder::new(vec![1, 7], vec![3]).unwrap();
    let names = builder.feature_names();

    let mut expected: Vec<String> = CALENDAR_FEATURES.iter().map(|s| s.to_string()).collect();
    expected.extend(
        [
            "sales_ma_3",
            "sales_trend",
            "sales_lag_1",
            "quantity_lag_1",
            "sales_lag_7",
            "quantity_lag_7",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    assert_eq!(names, expected);
}

#[test]
fn test_default_layout_has_26_features() {
    assert_eq!(FeatureBuilder::default().feature_names().len(), 11 + 2 + 1 + 12);
    assert_eq!(FeatureBuilder::default().max_lag(), 30);
}

#[test]
fn test_rows_before_max_lag_are_dropped() {
    let sales: Vec<f64> = (0..45).map(|i| i as f64).collect();
    let matrix = FeatureBuilder::default().build(&series(&sales)).unwrap();

    assert_eq!(matrix.len(), 45 - 30);
    assert_eq!(
        matrix.rows()[0].date,
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    );
    assert_eq!(matrix.sales_targets()[0], 30.0);
    assert_eq!(matrix.value(0, "sales_lag_1"), Some(29.0));
    assert_eq!(matrix.value(0, "sales_lag_30"), Some(0.0));
    assert_eq!(matrix.value(0, "quantity_lag_7"), Some(23.0));
    assert_eq!(matrix.value(0, "sales_trend"), Some(1.0));
}

#[test]
fn test_too_short_series_yields_no_rows() {
    let matrix = FeatureBuilder::default().build(&series(&[5.0; 30])).unwrap();
    assert!(matrix.is_empty());
}

#[test]
fn test_rolling_means_tolerate_partial_windows() {
    let builder = FeatureBuilder::new(vec![1], vec![4]).unwrap();
    let matrix = builder.build(&series(&[2.0, 4.0, 6.0, 8.0, 10.0])).unwrap();

    // Row 0 is always dropped; rows 1 and 2 see partial windows
    assert_eq!(matrix.len(), 4);
    assert_eq!(matrix.value(0, "sales_ma_4"), Some(3.0));
    assert_eq!(matrix.value(1, "sales_ma_4"), Some(4.0));
    assert_eq!(matrix.value(3, "sales_ma_4"), Some(7.0));
}

#[test]
fn test_non_increasing_dates_are_rejected() {
    let mut daily = series(&[1.0, 2.0, 3.0]);
    daily[2].date = daily[1].date;

    let result = FeatureBuilder::default().build(&daily);
    assert!(matches!(result, Err(ForecastError::FeatureComputationError(_))));
}

#[test]
fn test_non_finite_sales_are_rejected() {
    let mut daily = series(&[1.0, 2.0, 3.0]);
    daily[1].total_sales = f64::INFINITY;

    let result = FeatureBuilder::default().build(&daily);
    assert!(matches!(result, Err(ForecastError::FeatureComputationError(_))));
}

#[test]
fn test_assemble_checks_input_lengths() {
    let builder = FeatureBuilder::new(vec![1, 2], vec![7]).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let inputs = FeatureInputs {
        rolling_means: vec![1.0],
        trend: 0.0,
        sales_lags: vec![1.0],
        quantity_lags: vec![1.0, 2.0],
    };

    assert!(builder.assemble(date, &inputs).is_err());
}

#[test]
fn test_builder_rejects_zero_offsets() {
    assert!(FeatureBuilder::new(vec![0, 1], vec![7]).is_err());
    assert!(FeatureBuilder::new(vec![1], vec![]).is_err());
}

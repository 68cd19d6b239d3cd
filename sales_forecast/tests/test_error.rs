use forecast_math::MathError;
use sales_forecast::ForecastError;
use std::io;

#[test]
fn test_error_conversion() {
    // Test IO error conversion
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    // Test JSON error conversion
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let forecast_error = ForecastError::from(json_error);
    assert!(matches!(forecast_error, ForecastError::JsonError(_)));
}

#[test]
fn test_math_error_conversion() {
    let insufficient = ForecastError::from(MathError::InsufficientData("no rows".to_string()));
    assert!(insufficient.is_insufficient_history());

    let singular = ForecastError::from(MathError::CalculationError("SVD failed".to_string()));
    match singular {
        ForecastError::TrainingError(msg) => assert!(msg.contains("SVD failed")),
        other => panic!("Expected TrainingError, got {:?}", other),
    }

    let mismatch = ForecastError::from(MathError::DimensionMismatch {
        expected: 3,
        got: 2,
    });
    assert!(matches!(mismatch, ForecastError::TrainingError(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("margin must be between 0 and 1".to_string());
    assert_eq!(
        error.to_string(),
        "Invalid parameter: margin must be between 0 and 1"
    );

    let error = ForecastError::InsufficientHistoryError("12 transactions".to_string());
    assert!(error.to_string().starts_with("Insufficient history"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error = ForecastError::from(io_error);
    let error_string = error.to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}

#[test]
fn test_only_insufficient_history_is_expected() {
    let errors = [
        ForecastError::FeatureComputationError("unordered".to_string()),
        ForecastError::TrainingError("singular".to_string()),
        ForecastError::PersistenceError("down".to_string()),
        ForecastError::DataError("bad row".to_string()),
    ];
    assert!(errors.iter().all(|e| !e.is_insufficient_history()));
}

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sales_forecast::data::{parse_timestamp, DataLoader, TimeSeriesAggregator, TransactionRecord};
use sales_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

// One transaction per day starting 2024-01-01
fn daily_records(count: usize) -> Vec<TransactionRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let date = start + chrono::Duration::days(i as i64);
            TransactionRecord::new(date.and_hms_opt(9, 0, 0).unwrap(), 10.0, 1, 1)
        })
        .collect()
}

#[test]
fn test_aggregate_groups_by_calendar_day() {
    let mut records = daily_records(30);
    records.push(TransactionRecord::new(at(2024, 1, 1, 18), 5.5, 3, 2));
    records.push(TransactionRecord::new(at(2024, 1, 2, 23), 4.5, 2, 7));

    let daily = TimeSeriesAggregator::default().aggregate(&records, None).unwrap();

    assert_eq!(daily.len(), 30);
    assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(daily[0].total_sales, 15.5);
    assert_eq!(daily[0].total_quantity, 4);
    assert_eq!(daily[0].transaction_count, 2);
    assert_eq!(daily[1].total_sales, 14.5);
    assert_eq!(daily[2].transaction_count, 1);
}

#[test]
fn test_aggregate_output_is_sorted_for_unsorted_input() {
    let mut records = daily_records(30);
    records.reverse();

    let daily = TimeSeriesAggregator::default().aggregate(&records, None).unwrap();

    assert!(daily.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[rstest]
#[case(29, false)]
#[case(30, true)]
#[case(31, true)]
fn test_minimum_transaction_threshold(#[case] count: usize, #[case] accepted: bool) {
    let result = TimeSeriesAggregator::default().aggregate(&daily_records(count), None);

    match result {
        Ok(daily) => {
            assert!(accepted);
            assert_eq!(daily.len(), count);
        }
        Err(err) => {
            assert!(!accepted);
            assert!(err.is_insufficient_history());
        }
    }
}

#[test]
fn test_threshold_counts_transactions_not_days() {
    // 30 transactions on only 3 days
    let records: Vec<TransactionRecord> = (0..30)
        .map(|i| TransactionRecord::new(at(2024, 2, 1 + (i % 3), 10), 1.0, 1, 1))
        .collect();

    let daily = TimeSeriesAggregator::default().aggregate(&records, None).unwrap();
    assert_eq!(daily.len(), 3);
    assert_eq!(daily.iter().map(|d| d.transaction_count).sum::<usize>(), 30);
}

#[test]
fn test_since_filters_before_counting() {
    let records = daily_records(40);
    let since = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();

    // 30 records remain on or after the cutoff
    let daily = TimeSeriesAggregator::default()
        .aggregate(&records, Some(since))
        .unwrap();
    assert_eq!(daily.len(), 30);
    assert_eq!(daily[0].date, since);

    let later = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();
    let result = TimeSeriesAggregator::default().aggregate(&records, Some(later));
    assert!(matches!(result, Err(ForecastError::InsufficientHistoryError(_))));
}

#[test]
fn test_non_finite_amount_is_rejected() {
    let mut records = daily_records(30);
    records[4].amount = f64::NAN;

    let result = TimeSeriesAggregator::default().aggregate(&records, None);
    assert!(matches!(result, Err(ForecastError::FeatureComputationError(_))));
}

#[test]
fn test_load_transactions_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,amount,quantity,product_id").unwrap();
    writeln!(file, "2024-03-01 09:15:00,19.99,1,42").unwrap();
    writeln!(file, "2024-03-01T17:45:00,5.00,2,7").unwrap();
    writeln!(file, "2024-03-02,100.5,4,42").unwrap();

    let records = DataLoader::transactions_from_csv(file.path()).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(
        records[0],
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap(),
            19.99,
            1,
            42
        )
    );
    assert_eq!(records[1].quantity, 2);
    assert_eq!(records[2].date, at(2024, 3, 2, 0));
}

#[test]
fn test_csv_with_bad_date_is_a_data_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,amount,quantity,product_id").unwrap();
    writeln!(file, "01/03/2024,19.99,1,42").unwrap();

    let result = DataLoader::transactions_from_csv(file.path());
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_missing_csv_is_an_io_error() {
    let result = DataLoader::transactions_from_csv("/nonexistent/transactions.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[rstest]
#[case("2024-05-06 13:14:15", at(2024, 5, 6, 13) + chrono::Duration::seconds(14 * 60 + 15))]
#[case("2024-05-06T13:00:00", at(2024, 5, 6, 13))]
#[case(" 2024-05-06 ", at(2024, 5, 6, 0))]
fn test_parse_timestamp_formats(#[case] input: &str, #[case] expected: NaiveDateTime) {
    assert_eq!(parse_timestamp(input).unwrap(), expected);
}

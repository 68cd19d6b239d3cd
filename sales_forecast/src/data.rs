//! Transaction records and their daily aggregation

use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// A single sale as recorded by the upstream system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// When the sale happened
    pub date: NaiveDateTime,
    /// Total price of the sale
    pub amount: f64,
    /// Units sold
    pub quantity: i64,
    /// Product sold
    pub product_id: u64,
}

impl TransactionRecord {
    /// Create a new record
    pub fn new(date: NaiveDateTime, amount: f64, quantity: i64, product_id: u64) -> Self {
        Self {
            date,
            amount,
            quantity,
            product_id,
        }
    }

    /// Calendar day of the sale
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_sales: f64,
    pub total_quantity: i64,
    pub transaction_count: usize,
}

/// Groups transactions into a daily series
#[derive(Debug, Clone)]
pub struct TimeSeriesAggregator {
    min_transactions: usize,
}

impl Default for TimeSeriesAggregator {
    fn default() -> Self {
        Self {
            min_transactions: 30,
        }
    }
}

impl TimeSeriesAggregator {
    /// Create an aggregator requiring at least `min_transactions` records
    pub fn new(min_transactions: usize) -> Self {
        Self { min_transactions }
    }

    /// Minimum number of transactions required
    pub fn min_transactions(&self) -> usize {
        self.min_transactions
    }

    /// Aggregate records into one row per calendar day, ascending by date.
    ///
    /// Records before `since` are ignored. The threshold counts individual
    /// transactions inside the window, not distinct days.
    pub fn aggregate(
        &self,
        records: &[TransactionRecord],
        since: Option<NaiveDate>,
    ) -> Result<Vec<DailyAggregate>> {
        let mut by_day: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();
        let mut counted = 0usize;

        for record in records {
            let day = record.day();
            if since.map_or(false, |cutoff| day < cutoff) {
                continue;
            }
            if !record.amount.is_finite() {
                return Err(ForecastError::FeatureComputationError(format!(
                    "Non-finite sale amount on {}",
                    record.date
                )));
            }

            counted += 1;
            let entry = by_day.entry(day).or_insert_with(|| DailyAggregate {
                date: day,
                total_sales: 0.0,
                total_quantity: 0,
                transaction_count: 0,
            });
            entry.total_sales += record.amount;
            entry.total_quantity += record.quantity;
            entry.transaction_count += 1;
        }

        if counted < self.min_transactions {
            return Err(ForecastError::InsufficientHistoryError(format!(
                "{} transactions in window, need at least {}",
                counted, self.min_transactions
            )));
        }

        let daily: Vec<DailyAggregate> = by_day.into_values().collect();
        debug!(
            transactions = counted,
            days = daily.len(),
            "Aggregated transactions into daily series"
        );
        Ok(daily)
    }
}

/// Row layout of a transactions CSV file
#[derive(Debug, Deserialize)]
struct CsvTransaction {
    date: String,
    amount: f64,
    quantity: i64,
    product_id: u64,
}

/// Loader for transaction files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load transactions from a CSV file with a `date,amount,quantity,product_id` header
    pub fn transactions_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRecord>> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let row: CsvTransaction = row?;
            records.push(TransactionRecord {
                date: parse_timestamp(&row.date)?,
                amount: row.amount,
                quantity: row.quantity,
                product_id: row.product_id,
            });
        }

        Ok(records)
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare `YYYY-MM-DD` (midnight)
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ForecastError::DataError(format!("Unrecognised date: {}", value)))
}

//! Persistence contract for transactions and stored predictions

use crate::data::TransactionRecord;
use crate::error::{ForecastError, Result};
use crate::profit::ForecastPoint;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Identifier of the user owning a history
pub type UserId = u64;

/// What the forecasting pipeline needs from storage
pub trait SalesRepository {
    /// Transactions of `user_id` on or after `since`, ordered by date
    fn fetch_sales(
        &self,
        user_id: UserId,
        since: Option<NaiveDate>,
    ) -> Result<Vec<TransactionRecord>>;

    /// Replace every stored prediction of `user_id` with `points`.
    ///
    /// Must be atomic: on failure the previous set stays in place.
    fn replace_predictions(&self, user_id: UserId, points: &[ForecastPoint]) -> Result<()>;
}

/// A persisted prediction row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrediction {
    pub user_id: UserId,
    pub prediction_period: NaiveDate,
    pub predicted_sales: f64,
    pub predicted_profit: f64,
    pub created_at: DateTime<Utc>,
}

/// Repository kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    sales: RwLock<HashMap<UserId, Vec<TransactionRecord>>>,
    predictions: RwLock<HashMap<UserId, Vec<StoredPrediction>>>,
}

fn poisoned<T>(_: T) -> ForecastError {
    ForecastError::PersistenceError("Repository lock poisoned".to_string())
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append transactions for a user
    pub fn insert_sales(&self, user_id: UserId, records: Vec<TransactionRecord>) -> Result<()> {
        let mut sales = self.sales.write().map_err(poisoned)?;
        sales.entry(user_id).or_default().extend(records);
        Ok(())
    }

    /// Stored predictions of a user, in date order
    pub fn predictions(&self, user_id: UserId) -> Result<Vec<StoredPrediction>> {
        let predictions = self.predictions.read().map_err(poisoned)?;
        Ok(predictions.get(&user_id).cloned().unwrap_or_default())
    }
}

impl SalesRepository for InMemoryRepository {
    fn fetch_sales(
        &self,
        user_id: UserId,
        since: Option<NaiveDate>,
    ) -> Result<Vec<TransactionRecord>> {
        let sales = self.sales.read().map_err(poisoned)?;
        let mut records: Vec<TransactionRecord> = sales
            .get(&user_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| since.map_or(true, |cutoff| r.day() >= cutoff))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    fn replace_predictions(&self, user_id: UserId, points: &[ForecastPoint]) -> Result<()> {
        let created_at = Utc::now();
        let replacement: Vec<StoredPrediction> = points
            .iter()
            .map(|p| StoredPrediction {
                user_id,
                prediction_period: p.date,
                predicted_sales: p.predicted_sales,
                predicted_profit: p.predicted_profit,
                created_at,
            })
            .collect();

        // The full set is built before the lock is taken; the swap is one assignment
        let mut predictions = self.predictions.write().map_err(poisoned)?;
        let previous = predictions.insert(user_id, replacement);
        debug!(
            user_id = user_id,
            replaced = previous.map_or(0, |p| p.len()),
            stored = points.len(),
            "Replaced stored predictions"
        );
        Ok(())
    }
}

//! # Sales Forecast
//!
//! A Rust library for per-user daily sales forecasting with profit projection.
//!
//! ## Features
//!
//! - Daily aggregation of raw transactions with a minimum-history threshold
//! - Calendar, lag, rolling-mean and trend feature engineering
//! - Paired sales/quantity regression with a chronological validation split
//! - Recursive multi-day rollout feeding predictions back as lag inputs
//! - Weekday seasonal fallback for users with little history
//! - Profit projection under a configurable margin
//! - Persistence through a pluggable [`storage::SalesRepository`]
//!
//! ## Model Types
//!
//! | `ModelType` | Result label          | Accuracy metrics |
//! |-------------|-----------------------|------------------|
//! | `Linear`    | `linear_regression`   | yes              |
//! | `Simple`    | `simple_seasonal`     | no               |
//!
//! Too little history is not an error: the pipeline returns `Ok(None)`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::data::DataLoader;
//! use sales_forecast::models::ModelType;
//! use sales_forecast::pipeline::ForecastEngine;
//! use sales_forecast::storage::InMemoryRepository;
//! use sales_forecast::ForecastConfig;
//!
//! # fn main() -> Result<(), sales_forecast::ForecastError> {
//! let repository = InMemoryRepository::new();
//! repository.insert_sales(1, DataLoader::transactions_from_csv("sales.csv")?)?;
//!
//! let engine = ForecastEngine::new(repository, ForecastConfig::default())?;
//! if let Some(result) = engine.full_forecast(1, 30, ModelType::Linear)? {
//!     println!("{} days, {:.2} total", result.summary.total_days, result.summary.total_predicted_sales);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod profit;
pub mod storage;
pub mod summary;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{DailyAggregate, DataLoader, TimeSeriesAggregator, TransactionRecord};
pub use crate::error::ForecastError;
pub use crate::features::{FeatureBuilder, FeatureMatrix};
pub use crate::forecaster::Forecaster;
pub use crate::metrics::AccuracyMetrics;
pub use crate::models::{DailyForecast, ModelTrainer, ModelType, SimpleSeasonalFallback};
pub use crate::pipeline::{ForecastEngine, PipelineStage, PipelineTracker};
pub use crate::profit::{ForecastPoint, ProfitProjector};
pub use crate::storage::{InMemoryRepository, SalesRepository};
pub use crate::summary::{ForecastResult, ForecastSummary};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

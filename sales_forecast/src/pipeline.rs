//! End-to-end forecasting pipeline
//!
//! A run moves through `Loaded -> FeaturesBuilt -> Trained -> Forecasted ->
//! ProfitProjected -> Done`, or ends in `Failed`. Too little history is an
//! expected outcome and surfaces as `Ok(None)`; every other failure is
//! returned to the caller.

use crate::config::ForecastConfig;
use crate::data::{DailyAggregate, TimeSeriesAggregator, TransactionRecord};
use crate::error::{ForecastError, Result};
use crate::features::FeatureBuilder;
use crate::forecaster::Forecaster;
use crate::metrics::AccuracyMetrics;
use crate::models::{DailyForecast, ModelTrainer, ModelType, SimpleSeasonalFallback};
use crate::profit::ProfitProjector;
use crate::storage::{SalesRepository, UserId};
use crate::summary::{ForecastResult, ForecastSummary};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use forecast_math::{OlsRegressor, Regressor};
use std::fmt;
use tracing::{debug, info, warn};

/// Stage of a forecasting run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    Loaded,
    FeaturesBuilt,
    Trained,
    Forecasted,
    ProfitProjected,
    Done,
    Failed(String),
}

impl PipelineStage {
    /// The stage that follows on success, `None` for terminal stages
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Loaded => Some(PipelineStage::FeaturesBuilt),
            PipelineStage::FeaturesBuilt => Some(PipelineStage::Trained),
            PipelineStage::Trained => Some(PipelineStage::Forecasted),
            PipelineStage::Forecasted => Some(PipelineStage::ProfitProjected),
            PipelineStage::ProfitProjected => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Loaded => write!(f, "loaded"),
            PipelineStage::FeaturesBuilt => write!(f, "features_built"),
            PipelineStage::Trained => write!(f, "trained"),
            PipelineStage::Forecasted => write!(f, "forecasted"),
            PipelineStage::ProfitProjected => write!(f, "profit_projected"),
            PipelineStage::Done => write!(f, "done"),
            PipelineStage::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Enforces the stage order of one run
#[derive(Debug, Clone)]
pub struct PipelineTracker {
    stage: PipelineStage,
    visited: Vec<PipelineStage>,
}

impl Default for PipelineTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineTracker {
    /// Start a run with its history snapshot loaded
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Loaded,
            visited: vec![PipelineStage::Loaded],
        }
    }

    pub fn stage(&self) -> &PipelineStage {
        &self.stage
    }

    /// Every stage entered so far, in order
    pub fn visited(&self) -> &[PipelineStage] {
        &self.visited
    }

    /// Move to `next`, which must directly follow the current stage
    pub fn advance(&mut self, next: PipelineStage) -> Result<()> {
        if self.stage.next().as_ref() != Some(&next) {
            return Err(ForecastError::InvalidParameter(format!(
                "Illegal pipeline transition from {} to {}",
                self.stage, next
            )));
        }
        debug!(from = %self.stage, to = %next, "Pipeline transition");
        self.enter(next);
        Ok(())
    }

    /// End the run with a failure
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        if self.stage.is_terminal() {
            return Err(ForecastError::InvalidParameter(format!(
                "Cannot fail a run that already ended as {}",
                self.stage
            )));
        }
        let failed = PipelineStage::Failed(reason.into());
        debug!(from = %self.stage, to = %failed, "Pipeline transition");
        self.enter(failed);
        Ok(())
    }

    fn enter(&mut self, stage: PipelineStage) {
        self.visited.push(stage.clone());
        self.stage = stage;
    }
}

/// Runs forecasts for users of a repository
#[derive(Debug)]
pub struct ForecastEngine<S, R = OlsRegressor> {
    repository: S,
    config: ForecastConfig,
    regressor: R,
}

impl<S: SalesRepository> ForecastEngine<S, OlsRegressor> {
    /// Engine using ordinary least squares for the linear path
    pub fn new(repository: S, config: ForecastConfig) -> Result<Self> {
        Self::with_regressor(repository, config, OlsRegressor::new())
    }
}

impl<S: SalesRepository, R: Regressor + Clone> ForecastEngine<S, R> {
    /// Engine using a custom regressor for the linear path
    pub fn with_regressor(repository: S, config: ForecastConfig, regressor: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            repository,
            config,
            regressor,
        })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn repository(&self) -> &S {
        &self.repository
    }

    /// Forecast `horizon` days for `user_id` as of now, storing the result
    pub fn full_forecast(
        &self,
        user_id: UserId,
        horizon: usize,
        model_type: ModelType,
    ) -> Result<Option<ForecastResult>> {
        self.full_forecast_at(user_id, horizon, model_type, Utc::now())
    }

    /// Forecast as of `now`, which sets the lookback cutoff and `generated_at`
    pub fn full_forecast_at(
        &self,
        user_id: UserId,
        horizon: usize,
        model_type: ModelType,
        now: DateTime<Utc>,
    ) -> Result<Option<ForecastResult>> {
        let since = self.lookback_cutoff(now);
        let records = self.repository.fetch_sales(user_id, since)?;
        debug!(
            user_id = user_id,
            transactions = records.len(),
            ?since,
            "Loaded history snapshot"
        );

        let result = self.forecast_records(&records, horizon, model_type, now)?;

        if let Some(result) = &result {
            if self.config.persist {
                self.repository
                    .replace_predictions(user_id, &result.predictions)?;
            }
        }
        Ok(result)
    }

    /// Run the pipeline on an in-memory snapshot without touching storage
    pub fn forecast_records(
        &self,
        records: &[TransactionRecord],
        horizon: usize,
        model_type: ModelType,
        now: DateTime<Utc>,
    ) -> Result<Option<ForecastResult>> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least one day".to_string(),
            ));
        }

        let mut tracker = PipelineTracker::new();
        match self.run(&mut tracker, records, horizon, model_type, now) {
            Ok(result) => Ok(Some(result)),
            Err(err) => {
                // The run is not terminal yet, so recording the failure cannot fail
                let _ = tracker.fail(err.to_string());
                if err.is_insufficient_history() {
                    warn!(model = %model_type, reason = %err, "Not enough history to forecast");
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }

    fn lookback_cutoff(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        self.config
            .lookback_days()
            .map(|days| now.date_naive() - Duration::days(days))
    }

    fn run(
        &self,
        tracker: &mut PipelineTracker,
        records: &[TransactionRecord],
        horizon: usize,
        model_type: ModelType,
        now: DateTime<Utc>,
    ) -> Result<ForecastResult> {
        let aggregator = TimeSeriesAggregator::new(self.config.min_transactions);
        let daily = aggregator.aggregate(records, self.lookback_cutoff(now))?;

        let (days, accuracy) = match model_type {
            ModelType::Linear => self.run_linear(tracker, &daily, horizon)?,
            ModelType::Simple => self.run_simple(tracker, &daily, horizon)?,
        };
        tracker.advance(PipelineStage::Forecasted)?;

        let projection = ProfitProjector::new(self.config.profit_margin)?.project(&days)?;
        tracker.advance(PipelineStage::ProfitProjected)?;

        let summary = ForecastSummary::from_projection(&projection, accuracy.as_ref())
            .ok_or_else(|| ForecastError::InvalidParameter("Empty forecast".to_string()))?;

        let result = ForecastResult {
            predictions: projection.points,
            summary,
            accuracy,
            model_type: model_type.result_label().to_string(),
            generated_at: now,
        };
        tracker.advance(PipelineStage::Done)?;

        info!(
            model = result.model_type.as_str(),
            days = result.predictions.len(),
            total_sales = result.summary.total_predicted_sales,
            "Forecast complete"
        );
        Ok(result)
    }

    fn run_linear(
        &self,
        tracker: &mut PipelineTracker,
        daily: &[DailyAggregate],
        horizon: usize,
    ) -> Result<(Vec<DailyForecast>, Option<AccuracyMetrics>)> {
        let builder = FeatureBuilder::from_config(&self.config)?;
        let matrix = builder.build(daily)?;
        tracker.advance(PipelineStage::FeaturesBuilt)?;

        let trainer = ModelTrainer::with_regressor(
            self.regressor.clone(),
            self.config.train_ratio,
            self.config.min_training_rows,
        )?;
        let outcome = trainer.train(&matrix)?;
        tracker.advance(PipelineStage::Trained)?;

        let forecaster = Forecaster::new(&outcome.model, &builder, outcome.accuracy.sales.mae)?;
        let days = forecaster.forecast(daily, horizon)?;
        Ok((days, Some(outcome.accuracy)))
    }

    fn run_simple(
        &self,
        tracker: &mut PipelineTracker,
        daily: &[DailyAggregate],
        horizon: usize,
    ) -> Result<(Vec<DailyForecast>, Option<AccuracyMetrics>)> {
        let profile = SimpleSeasonalFallback::new().fit(daily)?;
        tracker.advance(PipelineStage::FeaturesBuilt)?;
        tracker.advance(PipelineStage::Trained)?;
        Ok((profile.forecast(horizon), None))
    }
}

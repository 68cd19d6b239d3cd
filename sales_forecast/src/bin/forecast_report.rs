use sales_forecast::data::DataLoader;
use sales_forecast::models::{ModelType, PolynomialTrend};
use sales_forecast::pipeline::ForecastEngine;
use sales_forecast::storage::{InMemoryRepository, SalesRepository};
use sales_forecast::{ForecastConfig, TimeSeriesAggregator};
use std::env;
use tracing::{info, warn};

const USER_ID: u64 = 1;

fn usage() -> String {
    "usage: forecast_report <transactions.csv> [horizon_days] [linear|simple] [config.json]"
        .to_string()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let csv_path = args.first().ok_or_else(usage)?;

    let config = match args.get(3) {
        Some(path) => ForecastConfig::from_json_file(path)?,
        None => ForecastConfig::default(),
    };
    let horizon = match args.get(1) {
        Some(value) => value.parse::<usize>()?,
        None => config.horizon_days,
    };
    let model_type = match args.get(2) {
        Some(value) => value.parse::<ModelType>()?,
        None => ModelType::Linear,
    };

    let repository = InMemoryRepository::new();
    let records = DataLoader::transactions_from_csv(csv_path)?;
    info!(path = csv_path.as_str(), transactions = records.len(), "Loaded transactions");
    repository.insert_sales(USER_ID, records)?;

    let engine = ForecastEngine::new(repository, config)?;

    // Polynomial trend over the same history, reported for comparison only
    let history = engine.repository().fetch_sales(USER_ID, None)?;
    let aggregator = TimeSeriesAggregator::new(engine.config().min_transactions);
    if let Ok(daily) = aggregator.aggregate(&history, None) {
        match PolynomialTrend::default().fit(&daily) {
            Ok(fit) => info!(
                mae = fit.accuracy().mae,
                rmse = fit.accuracy().rmse,
                r2 = fit.accuracy().r2,
                "Polynomial trend baseline"
            ),
            Err(err) => warn!(error = %err, "Polynomial trend baseline unavailable"),
        }
    }

    match engine.full_forecast(USER_ID, horizon, model_type)? {
        Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        None => {
            warn!("Not enough history to produce a forecast");
            println!("null");
        }
    }

    Ok(())
}

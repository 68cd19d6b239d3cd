use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use sales_forecast::models::ModelType;
use sales_forecast::pipeline::ForecastEngine;
use sales_forecast::storage::InMemoryRepository;
use sales_forecast::{ForecastConfig, TransactionRecord};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sales Forecast: Basic Forecast Example");
    println!("======================================\n");

    // Create sample data
    println!("Creating sample data...");
    let records = create_sample_transactions(180);
    println!("Sample data created: {} transactions\n", records.len());

    let repository = InMemoryRepository::new();
    repository.insert_sales(1, records)?;

    let engine = ForecastEngine::new(repository, ForecastConfig::default())?;
    let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();

    for model_type in [ModelType::Linear, ModelType::Simple] {
        println!("Running {} model...", model_type);
        let Some(result) = engine.full_forecast_at(1, 14, model_type, now)? else {
            println!("Not enough history\n");
            continue;
        };

        println!("Model: {}", result.model_type);
        if let Some(accuracy) = &result.accuracy {
            println!("{}", accuracy);
        }
        println!("Date         Sales      Lower      Upper      Profit     Qty");
        for point in &result.predictions {
            println!(
                "{}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9.2}  {:>4}",
                point.date,
                point.predicted_sales,
                point.confidence_lower,
                point.confidence_upper,
                point.predicted_profit,
                point.predicted_quantity
            );
        }
        println!(
            "Total sales: {:.2}, total profit: {:.2}, peak on {}\n",
            result.summary.total_predicted_sales,
            result.summary.total_predicted_profit,
            result.summary.peak_day.date
        );
    }

    let stored = engine.repository().predictions(1)?;
    println!("Stored predictions: {}", stored.len());

    Ok(())
}

// Two sales a day with a weekly pattern and slow growth
fn create_sample_transactions(days: i64) -> Vec<TransactionRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    let mut records = Vec::new();

    for day in 0..days {
        let date = start + Duration::days(day);
        let weekday = date.weekday().num_days_from_monday() as f64;
        let weekend_boost = if weekday >= 5.0 { 40.0 } else { 0.0 };
        let base = 100.0 + day as f64 * 0.5 + weekend_boost;

        for (hour, share) in [(10, 0.6), (16, 0.4)] {
            let timestamp = date.and_hms_opt(hour, 0, 0).unwrap();
            let amount = base * share;
            records.push(TransactionRecord::new(
                timestamp,
                amount,
                (amount / 10.0).round() as i64,
                (day % 5) as u64,
            ));
        }
    }

    records
}

//! Example: Scoring tune candidates in parallel

use chrono::{Duration, TimeZone, Utc};
use qtradex_rs::data::{Candle, CandleSeries};
use qtradex_rs::optimize::{best_by, CandidateEvaluator, Objective};
use qtradex_rs::strategy::EmaCross;
use qtradex_rs::tune::Tune;
use qtradex_rs::Result;

fn create_test_candles(count: usize) -> CandleSeries {
    let base_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let price = 100.0 + (i as f64 / 9.0).sin() * 8.0 + i as f64 * 0.02;
            Candle::new(
                price,
                price + 1.0,
                price - 1.0,
                price,
                1000.0,
                base_time + Duration::days(i as i64),
                "BTC/USDT".to_string(),
                "1d".to_string(),
            )
        })
        .collect::<Vec<_>>()
        .into()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let series = create_test_candles(400);

    // A fixed grid; a real optimizer would generate these
    let mut candidates = Vec::new();
    for fast in [5.0, 8.0, 12.0] {
        for slow in [20.0, 30.0, 45.0] {
            candidates.push(
                Tune::new()
                    .with("fast_period", fast)
                    .with("slow_period", slow)
                    .with("trade_fraction", 1.0),
            );
        }
    }

    let results = CandidateEvaluator::default().evaluate(EmaCross::new, &series, candidates);
    for result in &results {
        match &result.outcome {
            Ok(run) => println!("{:>2}: {} roi={:.4}", result.index, result.tune.to_json()?, run.score("roi").unwrap_or(0.0)),
            Err(err) => println!("{:>2}: {} failed: {err:#}", result.index, result.tune.to_json()?),
        }
    }

    if let Some(best) = best_by(&results, "roi", Objective::Maximize) {
        println!("\nBest candidate: {}", best.tune.to_json()?);
    }

    Ok(())
}

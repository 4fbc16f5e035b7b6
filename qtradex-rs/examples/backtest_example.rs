//! Example: Backtesting the RSI band strategy

use chrono::{Duration, TimeZone, Utc};
use qtradex_rs::backtest::{BacktestEngine, BacktestReport};
use qtradex_rs::config::BacktestConfig;
use qtradex_rs::data::{Candle, CandleSeries};
use qtradex_rs::strategy::{RsiBand, Strategy};
use qtradex_rs::Result;

fn create_test_candles(count: usize, base_price: f64) -> CandleSeries {
    let base_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    (0..count)
        .map(|i| {
            // Up then down, with a slow wave on top
            let trend = if i < count / 2 { 0.1 } else { -0.1 };
            let wave = (i as f64 / 6.0).sin() * 4.0;
            let price = base_price + (i as f64 * trend) + wave;

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

    println!("=== QTradeX-RS Backtest Example ===\n");

    let series = create_test_candles(500, 100.0);
    let mut strategy = RsiBand::default();
    println!("Strategy: {} (warm-up {} days)", strategy.name(), strategy.autorange());

    let engine = BacktestEngine::new(BacktestConfig::from_env()?);
    let result = engine.run(&mut strategy, &series)?;

    if !engine.plot(&strategy, &series, &result, false)? {
        println!("No custom plot, showing the report only");
    }

    let report = BacktestReport::new(result);
    println!("{}", report.format());

    Ok(())
}

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use qtradex_rs::backtest::BacktestEngine;
use qtradex_rs::data::{Candle, CandleSeries};
use qtradex_rs::optimize::CandidateEvaluator;
use qtradex_rs::strategy::{EmaCross, RsiBand};
use qtradex_rs::tune::Tune;

fn make_candles(n: usize) -> CandleSeries {
    let base_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            // Trending price with some noise
            let trend = (i as f64) * 0.001;
            let noise = ((i as f64) * 0.1).sin() * 5.0;
            let price = 100.0 + trend + noise;
            Candle::new(
                price,
                price + 0.5,
                price - 0.5,
                price,
                1000.0 + i as f64,
                base_time + Duration::hours(i as i64),
                "BTC/USDT".to_string(),
                "1h".to_string(),
            )
        })
        .collect::<Vec<_>>()
        .into()
}

fn bench_single_run(c: &mut Criterion) {
    let candles = make_candles(10_000);
    let engine = BacktestEngine::default();

    c.bench_function("rsi_band_10k", |b| {
        b.iter(|| {
            let mut strategy = RsiBand::default();
            let result = engine.run(&mut strategy, black_box(&candles));
            black_box(result.ok());
        });
    });
}

fn bench_candidates_parallel(c: &mut Criterion) {
    let candles = make_candles(10_000);
    let candidates: Vec<Tune> = (2..10)
        .map(|fast| {
            Tune::new()
                .with("fast_period", fast as f64)
                .with("slow_period", (fast * 3) as f64)
        })
        .collect();
    let evaluator = CandidateEvaluator::default();

    c.bench_function("ema_cross_candidates_10k", |b| {
        b.iter(|| {
            let results = evaluator.evaluate(EmaCross::new, black_box(&candles), candidates.clone());
            black_box(results);
        });
    });
}

criterion_group!(benches, bench_single_run, bench_candidates_parallel);
criterion_main!(benches);

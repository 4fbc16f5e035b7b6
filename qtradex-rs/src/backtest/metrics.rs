//! Backtest performance metrics

use crate::backtest::BacktestResult;
use crate::strategy::Fitness;
use std::collections::BTreeMap;
use tracing::warn;

/// Metric names understood by [`evaluate`]
pub const METRICS: &[&str] = &[
    "roi",
    "profit",
    "trade_count",
    "win_rate",
    "max_drawdown",
    "sharpe_ratio",
    "sortino_ratio",
    "profit_factor",
];

/// Compute every metric requested by `fitness`.
///
/// Unknown metric names are logged and skipped.
pub fn evaluate(fitness: &Fitness, result: &BacktestResult) -> BTreeMap<String, f64> {
    let mut scores = BTreeMap::new();
    for metric in &fitness.metrics {
        let risk_free = fitness.param(metric, "risk_free").unwrap_or(0.0);
        let value = match metric.as_str() {
            "roi" => MetricsCalculator::roi(result),
            "profit" => result.end_value - result.start_value,
            "trade_count" => result.trades.len() as f64,
            "win_rate" => MetricsCalculator::win_rate(result),
            "max_drawdown" => MetricsCalculator::max_drawdown(&result.equity_curve()),
            "sharpe_ratio" => MetricsCalculator::sharpe_ratio(&result.equity_curve(), risk_free),
            "sortino_ratio" => MetricsCalculator::sortino_ratio(&result.equity_curve(), risk_free),
            "profit_factor" => MetricsCalculator::profit_factor(result),
            unknown => {
                warn!(metric = unknown, "unknown fitness metric, skipping");
                continue;
            }
        };
        scores.insert(metric.clone(), value);
    }
    scores
}

/// Calculate metrics from backtest result
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Final wallet value over starting value (1.0 = break even)
    pub fn roi(result: &BacktestResult) -> f64 {
        if result.start_value <= 0.0 {
            return 0.0;
        }
        result.end_value / result.start_value
    }

    /// Fraction of closed round trips with positive profit
    pub fn win_rate(result: &BacktestResult) -> f64 {
        let closed: Vec<f64> = result.trades.iter().filter_map(|t| t.pnl).collect();
        if closed.is_empty() {
            return 0.0;
        }
        closed.iter().filter(|pnl| **pnl > 0.0).count() as f64 / closed.len() as f64
    }

    /// Gross profit over gross loss of closed round trips.
    ///
    /// Infinite when there are profits and no losses, 0 when there are no profits.
    pub fn profit_factor(result: &BacktestResult) -> f64 {
        let (profit, loss) = result
            .trades
            .iter()
            .filter_map(|t| t.pnl)
            .fold((0.0, 0.0), |(profit, loss), pnl| {
                if pnl > 0.0 {
                    (profit + pnl, loss)
                } else {
                    (profit, loss - pnl)
                }
            });
        if loss == 0.0 {
            return if profit > 0.0 { f64::INFINITY } else { 0.0 };
        }
        profit / loss
    }

    /// Largest peak-to-trough decline as a fraction of the peak
    pub fn max_drawdown(equity: &[f64]) -> f64 {
        let mut max_drawdown = 0.0;
        let mut peak = f64::MIN;
        for &value in equity {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 {
                let drawdown = (peak - value) / peak;
                if drawdown > max_drawdown {
                    max_drawdown = drawdown;
                }
            }
        }
        max_drawdown
    }

    /// Mean excess return over its standard deviation, per tick
    pub fn sharpe_ratio(equity: &[f64], risk_free: f64) -> f64 {
        let excess = excess_returns(equity, risk_free);
        if excess.len() < 2 {
            return 0.0;
        }
        let mean = mean(&excess);
        let variance = excess.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / excess.len() as f64;
        let std_dev = variance.sqrt();
        if std_dev > 0.0 {
            mean / std_dev
        } else {
            0.0
        }
    }

    /// Mean excess return over downside deviation, per tick
    pub fn sortino_ratio(equity: &[f64], risk_free: f64) -> f64 {
        let excess = excess_returns(equity, risk_free);
        if excess.len() < 2 {
            return 0.0;
        }
        let downside = excess.iter().map(|r| r.min(0.0).powi(2)).sum::<f64>() / excess.len() as f64;
        let downside_dev = downside.sqrt();
        if downside_dev > 0.0 {
            mean(&excess) / downside_dev
        } else {
            0.0
        }
    }
}

fn excess_returns(equity: &[f64], risk_free: f64) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0 - risk_free)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::Trade;
    use crate::portfolio::Wallet;
    use crate::snapshot::Info;
    use crate::strategy::Signal;
    use crate::tune::Tune;
    use chrono::Utc;
    use uuid::Uuid;

    fn trade(signal: Signal, pnl: Option<f64>) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            time: Utc::now(),
            signal,
            price: 100.0,
            quantity: 1.0,
            cost: 100.0,
            fee: 0.0,
            pnl,
        }
    }

    /// Result with the given sell P&Ls and equity values
    fn result_with(pnls: &[f64], equity: &[f64]) -> BacktestResult {
        let trades = pnls
            .iter()
            .flat_map(|&pnl| [trade(Signal::Buy, None), trade(Signal::Sell, Some(pnl))])
            .collect();
        let raw_states = equity
            .iter()
            .map(|&value| Info::builder().with("value", value).publish())
            .collect();
        let end_value = equity.last().copied().unwrap_or(0.0);
        BacktestResult {
            strategy: "fixture".to_string(),
            tune: Tune::new(),
            asset: "BTC".to_string(),
            currency: "USDT".to_string(),
            warmup: 0,
            first_tick: 0,
            start_value: equity.first().copied().unwrap_or(0.0),
            end_value,
            final_wallet: Wallet::new(0.0, end_value),
            trades,
            states: Vec::new(),
            raw_states,
            indicators: Default::default(),
            fitness: Fitness::roi(),
            scores: BTreeMap::new(),
        }
    }

    #[test]
    fn test_trade_metrics_on_known_trades() {
        let result = result_with(&[30.0, -10.0, 20.0, -10.0], &[1000.0, 1030.0, 1020.0, 1040.0, 1030.0]);
        assert_eq!(MetricsCalculator::win_rate(&result), 0.5);
        assert_eq!(MetricsCalculator::profit_factor(&result), 2.5);
        assert_eq!(MetricsCalculator::roi(&result), 1.03);
    }

    #[test]
    fn test_profit_factor_without_losses() {
        let winners = result_with(&[100.0, 91.5], &[1000.0, 1191.5]);
        assert_eq!(MetricsCalculator::profit_factor(&winners), f64::INFINITY);
        assert_eq!(MetricsCalculator::win_rate(&winners), 1.0);

        let flat = result_with(&[0.0], &[1000.0, 1000.0]);
        assert_eq!(MetricsCalculator::profit_factor(&flat), 0.0);
        assert_eq!(MetricsCalculator::profit_factor(&result_with(&[], &[1000.0])), 0.0);
    }

    #[test]
    fn test_roi_without_start_value() {
        assert_eq!(MetricsCalculator::roi(&result_with(&[], &[])), 0.0);
    }

    #[test]
    fn test_evaluate_scores_requested_metrics() {
        let result = result_with(&[30.0, -10.0], &[1000.0, 1030.0, 1020.0]);
        let fitness = Fitness::new(["roi", "profit", "trade_count", "win_rate", "made_up", "max_drawdown"]);

        let scores = evaluate(&fitness, &result);
        assert_eq!(scores.len(), 5);
        assert_eq!(scores["roi"], 1.02);
        assert_eq!(scores["profit"], 20.0);
        assert_eq!(scores["trade_count"], 4.0);
        assert_eq!(scores["win_rate"], 0.5);
        assert!(!scores.contains_key("made_up"));
        // Peak 1030, trough 1020
        assert!((scores["max_drawdown"] - 10.0 / 1030.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_passes_risk_free_param() {
        let result = result_with(&[], &[100.0, 101.0, 103.0, 102.0, 105.0]);
        let plain = evaluate(&Fitness::new(["sharpe_ratio"]), &result);
        let hurdle = evaluate(
            &Fitness::new(["sharpe_ratio"]).with_param("sharpe_ratio", "risk_free", 0.05),
            &result,
        );
        assert!(plain["sharpe_ratio"] > 0.0);
        assert!(hurdle["sharpe_ratio"] < 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        assert_eq!(MetricsCalculator::max_drawdown(&[100.0, 120.0, 90.0, 130.0]), 0.25);
        assert_eq!(MetricsCalculator::max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
        assert_eq!(MetricsCalculator::max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_ratios_on_flat_equity() {
        let flat = [100.0; 5];
        assert_eq!(MetricsCalculator::sharpe_ratio(&flat, 0.0), 0.0);
        assert_eq!(MetricsCalculator::sortino_ratio(&flat, 0.0), 0.0);
    }

    #[test]
    fn test_ratios_sign() {
        let rising = [100.0, 101.0, 103.0, 102.0, 105.0];
        assert!(MetricsCalculator::sharpe_ratio(&rising, 0.0) > 0.0);
        assert!(MetricsCalculator::sortino_ratio(&rising, 0.0) > 0.0);

        let falling = [100.0, 99.0, 97.0, 98.0, 95.0];
        assert!(MetricsCalculator::sortino_ratio(&falling, 0.0) < 0.0);
    }
}

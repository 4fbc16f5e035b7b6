//! Backtest report generation

use crate::backtest::{BacktestResult, MetricsCalculator};

/// Backtest report
#[derive(Debug)]
pub struct BacktestReport {
    result: BacktestResult,
    win_rate: f64,
    max_drawdown: f64,
}

impl BacktestReport {
    /// Create new report from result
    pub fn new(result: BacktestResult) -> Self {
        let win_rate = MetricsCalculator::win_rate(&result);
        let max_drawdown = MetricsCalculator::max_drawdown(&result.equity_curve());

        Self {
            result,
            win_rate,
            max_drawdown,
        }
    }

    /// Format report as string
    pub fn format(&self) -> String {
        let r = &self.result;
        let mut out = format!(
            r#"
Backtest Results: {strategy} ({asset}/{currency})
================
Warm-up Candles: {warmup}
Starting Value: {start:.2} {currency}
Ending Value: {end:.2} {currency}
Final Wallet: {assets:.6} {asset} + {cash:.2} {currency}
Number of Trades: {trades}
Win Rate: {win_rate:.2}%
Maximum Drawdown: {drawdown:.2}%
"#,
            strategy = r.strategy,
            asset = r.asset,
            currency = r.currency,
            warmup = r.warmup,
            start = r.start_value,
            end = r.end_value,
            assets = r.final_wallet.assets,
            cash = r.final_wallet.currency,
            trades = r.trades.len(),
            win_rate = self.win_rate * 100.0,
            drawdown = self.max_drawdown * 100.0,
        );

        out.push_str("Fitness:\n");
        for metric in &r.fitness.metrics {
            match r.score(metric) {
                Some(value) => out.push_str(&format!("  {metric}: {value:.4}\n")),
                None => out.push_str(&format!("  {metric}: n/a\n")),
            }
        }
        out
    }

    /// Get result reference
    pub fn result(&self) -> &BacktestResult {
        &self.result
    }
}

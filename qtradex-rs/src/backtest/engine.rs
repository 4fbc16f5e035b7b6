//! Backtesting engine

use crate::backtest::metrics;
use crate::config::BacktestConfig;
use crate::data::{Candle, CandleSeries};
use crate::error::{Hook, StrategyError};
use crate::portfolio::{Fill, Wallet};
use crate::snapshot::{Info, SnapshotBuilder};
use crate::strategy::{Fitness, Indicators, Signal, Strategy, StrategyValidator};
use crate::tune::Tune;
use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// State key holding the trade direction in `states`
pub const TRADE_KEY: &str = "trade";

/// Executed trade record
#[derive(Debug, Clone)]
pub struct Trade {
    pub id: Uuid,
    pub time: DateTime<Utc>,
    pub signal: Signal,
    pub price: f64,
    pub quantity: f64,
    /// Currency spent (buys) or received net of fees (sells)
    pub cost: f64,
    pub fee: f64,
    /// Realized profit of the round trip closed by this sell
    pub pnl: Option<f64>,
}

/// Backtest result
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub strategy: String,
    pub tune: Tune,
    pub asset: String,
    pub currency: String,
    /// Candles skipped for warm-up
    pub warmup: usize,
    /// Index of the first traded candle
    pub first_tick: usize,
    /// Wallet value at the first traded candle
    pub start_value: f64,
    /// Wallet value at the last candle
    pub end_value: f64,
    pub final_wallet: Wallet,
    pub trades: Vec<Trade>,
    /// States of ticks that traded, after the fill
    pub states: Vec<Info>,
    /// State of every traded tick, before the decision
    pub raw_states: Vec<Info>,
    pub indicators: Indicators,
    pub fitness: Fitness,
    /// Values of the fitness metrics
    pub scores: BTreeMap<String, f64>,
}

impl BacktestResult {
    /// Score of a fitness metric, if it was computed
    pub fn score(&self, metric: &str) -> Option<f64> {
        self.scores.get(metric).copied()
    }

    /// Wallet value at every traded tick followed by the final value
    pub fn equity_curve(&self) -> Vec<f64> {
        self.raw_states
            .iter()
            .filter_map(|state| state.get("value"))
            .chain(std::iter::once(self.end_value))
            .collect()
    }
}

/// Single-asset backtesting engine.
///
/// Drives one strategy through reset, indicator computation, per-candle
/// decisions and the final fitness call. Every strategy error aborts the run.
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// Create new backtest engine
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run backtest
    pub fn run<S: Strategy + ?Sized>(&self, strategy: &mut S, data: &CandleSeries) -> Result<BacktestResult> {
        let name = strategy.name().to_string();
        StrategyValidator::validate(&*strategy).with_context(|| format!("strategy `{name}` rejected"))?;

        if data.is_empty() {
            bail!("no market data for strategy `{name}`");
        }

        strategy.reset();

        let autorange = strategy.autorange();
        let warmup = data.periods_to_candles(autorange);
        if warmup >= data.len() {
            bail!(
                "{} candles cannot cover a warm-up of {} candles ({} periods)",
                data.len(),
                warmup,
                autorange
            );
        }

        let indicators = strategy
            .indicators(data)
            .with_context(|| format!("strategy `{name}` failed to compute indicators"))?;
        let first_tick = first_tradable_tick(&indicators, data.len(), warmup)?;

        info!(
            strategy = %name,
            candles = data.len(),
            warmup,
            first_tick,
            "starting backtest"
        );

        let candles = data.candles();
        let fee = self.config.fee;
        let mut wallet = Wallet::new(self.config.initial_assets, self.config.initial_currency);
        let start_value = wallet.value(candles[first_tick].close);
        let mut trades = Vec::new();
        let mut states = Vec::new();
        let mut raw_states = Vec::with_capacity(data.len() - first_tick);
        let mut basis = CostBasis::default();

        for (index, candle) in candles.iter().enumerate().skip(first_tick) {
            let state = state_snapshot(candle, &wallet).publish();
            let tick = tick_snapshot(&indicators, index, data.len());

            let decision = strategy
                .strategy(&state, &tick)
                .with_context(|| format!("strategy `{name}` failed at {}", candle.timestamp))?;
            let signal = strategy.execution(decision, &tick, &wallet);

            let fill = match signal {
                Signal::Buy => {
                    let amount = clamp_trade_amount(strategy.get_trade_amount(wallet.currency), wallet.currency);
                    wallet.buy(amount, candle.close, fee)
                }
                Signal::Sell => wallet.sell_all(candle.close, fee),
                Signal::Hold => None,
            };

            if let Some(fill) = fill {
                let trade = record_trade(signal, candle, fill, &mut basis);
                debug!(%signal, price = candle.close, quantity = fill.quantity, pnl = ?trade.pnl, "trade executed");
                trades.push(trade);
                states.push(
                    state_snapshot(candle, &wallet)
                        .with(TRADE_KEY, signal.direction())
                        .publish(),
                );
            }
            raw_states.push(state);
        }

        let last_close = candles[candles.len() - 1].close;
        let fitness = strategy.fitness(&states, &raw_states, &self.config.asset, &self.config.currency);

        let mut result = BacktestResult {
            strategy: name,
            tune: strategy.tune().clone(),
            asset: self.config.asset.clone(),
            currency: self.config.currency.clone(),
            warmup,
            first_tick,
            start_value,
            end_value: wallet.value(last_close),
            final_wallet: wallet,
            trades,
            states,
            raw_states,
            indicators,
            fitness,
            scores: BTreeMap::new(),
        };
        result.scores = metrics::evaluate(&result.fitness, &result);

        info!(
            strategy = %result.strategy,
            trades = result.trades.len(),
            start_value = result.start_value,
            end_value = result.end_value,
            scores = ?result.scores,
            "backtest finished"
        );

        Ok(result)
    }

    /// Ask the strategy for its custom plot.
    ///
    /// Returns `Ok(false)` when the strategy has none, so callers can fall back
    /// to their default rendering.
    pub fn plot<S: Strategy + ?Sized>(
        &self,
        strategy: &S,
        data: &CandleSeries,
        result: &BacktestResult,
        block: bool,
    ) -> Result<bool> {
        match strategy.plot(data, &result.states, &result.indicators, block) {
            Ok(()) => Ok(true),
            Err(StrategyError::NotImplemented(Hook::Plot)) => {
                debug!(strategy = strategy.name(), "no custom plot available");
                Ok(false)
            }
            Err(err) => Err(err).context("custom plot failed"),
        }
    }
}

/// First index where warm-up is over and every indicator series has a value
fn first_tradable_tick(indicators: &Indicators, len: usize, warmup: usize) -> Result<usize> {
    let mut coverage = len;
    for (key, series) in indicators {
        if series.len() > len {
            bail!("indicator `{key}` has {} values for {len} candles", series.len());
        }
        coverage = coverage.min(series.len());
    }

    let first = warmup.max(len - coverage);
    if first >= len {
        bail!("no tradable candles: warm-up {warmup}, shortest indicator covers {coverage} of {len}");
    }
    Ok(first)
}

fn state_snapshot(candle: &Candle, wallet: &Wallet) -> SnapshotBuilder {
    Info::builder()
        .with("unix", candle.timestamp.timestamp() as f64)
        .with("open", candle.open)
        .with("high", candle.high)
        .with("low", candle.low)
        .with("close", candle.close)
        .with("volume", candle.volume)
        .with("assets", wallet.assets)
        .with("currency", wallet.currency)
        .with("value", wallet.value(candle.close))
}

/// Scalar indicator values at `index`, with series right-aligned to `len`
fn tick_snapshot(indicators: &Indicators, index: usize, len: usize) -> Info {
    indicators
        .iter()
        .filter_map(|(key, series)| {
            let offset = len - series.len();
            let value = series.get(index.checked_sub(offset)?)?;
            Some((key.as_str(), *value))
        })
        .collect()
}

fn clamp_trade_amount(amount: f64, balance: f64) -> f64 {
    if !amount.is_finite() || amount < 0.0 || amount > balance {
        warn!(amount, balance, "trade amount outside available balance, clamping");
    }
    if amount.is_finite() {
        amount.clamp(0.0, balance.max(0.0))
    } else if amount > 0.0 {
        balance.max(0.0)
    } else {
        0.0
    }
}

/// Currency spent and asset units acquired by buys since the last sell
#[derive(Debug, Clone, Copy, Default)]
struct CostBasis {
    cost: f64,
    quantity: f64,
}

fn record_trade(signal: Signal, candle: &Candle, fill: Fill, basis: &mut CostBasis) -> Trade {
    let pnl = match signal {
        Signal::Buy => {
            basis.cost += fill.cost;
            basis.quantity += fill.quantity;
            None
        }
        // Only the bought share of a sale closes a round trip; assets held
        // from the start have no cost basis
        _ => {
            let pnl = (basis.quantity > 0.0 && fill.quantity > 0.0).then(|| {
                let proceeds = if basis.quantity >= fill.quantity {
                    fill.cost
                } else {
                    fill.cost * basis.quantity / fill.quantity
                };
                proceeds - basis.cost
            });
            *basis = CostBasis::default();
            pnl
        }
    };
    Trade {
        id: Uuid::new_v4(),
        time: candle.timestamp,
        signal,
        price: candle.close,
        quantity: fill.quantity,
        cost: fill.cost,
        fee: fill.fee,
        pnl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tradable_tick() {
        let mut indicators = Indicators::new();
        assert_eq!(first_tradable_tick(&indicators, 10, 3).unwrap(), 3);

        indicators.insert("a".to_string(), vec![0.0; 5]);
        assert_eq!(first_tradable_tick(&indicators, 10, 3).unwrap(), 5);
        assert_eq!(first_tradable_tick(&indicators, 10, 8).unwrap(), 8);

        indicators.insert("b".to_string(), Vec::new());
        assert!(first_tradable_tick(&indicators, 10, 3).is_err());

        let mut long = Indicators::new();
        long.insert("c".to_string(), vec![0.0; 11]);
        assert!(first_tradable_tick(&long, 10, 0).is_err());
    }

    #[test]
    fn test_tick_snapshot_is_right_aligned() {
        let mut indicators = Indicators::new();
        indicators.insert("full".to_string(), vec![1.0, 2.0, 3.0, 4.0]);
        indicators.insert("short".to_string(), vec![30.0, 40.0]);

        let tick = tick_snapshot(&indicators, 3, 4);
        assert_eq!(tick.lookup("full").unwrap(), 4.0);
        assert_eq!(tick.lookup("short").unwrap(), 40.0);

        let tick = tick_snapshot(&indicators, 1, 4);
        assert_eq!(tick.lookup("full").unwrap(), 2.0);
        assert!(!tick.contains_key("short"));
    }

    #[test]
    fn test_clamp_trade_amount() {
        assert_eq!(clamp_trade_amount(50.0, 100.0), 50.0);
        assert_eq!(clamp_trade_amount(150.0, 100.0), 100.0);
        assert_eq!(clamp_trade_amount(-5.0, 100.0), 0.0);
        assert_eq!(clamp_trade_amount(f64::NAN, 100.0), 0.0);
        assert_eq!(clamp_trade_amount(f64::INFINITY, 100.0), 100.0);
    }

    fn candle(close: f64) -> Candle {
        Candle::new(
            close,
            close,
            close,
            close,
            1.0,
            chrono::Utc::now(),
            "BTC/USDT".to_string(),
            "1d".to_string(),
        )
    }

    #[test]
    fn test_pnl_ignores_initial_assets() {
        let mut wallet = Wallet::new(1.0, 1000.0);
        let mut basis = CostBasis::default();

        let fill = wallet.buy(500.0, 100.0, 0.0).unwrap();
        assert!(record_trade(Signal::Buy, &candle(100.0), fill, &mut basis).pnl.is_none());

        // Sells 6 units, one of them held from the start
        let fill = wallet.sell_all(100.0, 0.0).unwrap();
        assert_eq!(fill.quantity, 6.0);
        let trade = record_trade(Signal::Sell, &candle(100.0), fill, &mut basis);
        assert_eq!(trade.pnl, Some(0.0));
    }

    #[test]
    fn test_pnl_of_bought_share() {
        let mut wallet = Wallet::new(2.0, 1000.0);
        let mut basis = CostBasis::default();

        let fill = wallet.buy(1000.0, 100.0, 0.0).unwrap();
        record_trade(Signal::Buy, &candle(100.0), fill, &mut basis);

        let fill = wallet.sell_all(120.0, 0.0).unwrap();
        let trade = record_trade(Signal::Sell, &candle(120.0), fill, &mut basis);
        assert!((trade.pnl.unwrap() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_selling_only_initial_assets_has_no_pnl() {
        let mut wallet = Wallet::new(1.0, 0.0);
        let mut basis = CostBasis::default();
        let fill = wallet.sell_all(100.0, 0.0).unwrap();
        assert_eq!(record_trade(Signal::Sell, &candle(100.0), fill, &mut basis).pnl, None);
    }
}

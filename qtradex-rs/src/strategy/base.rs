//! Base strategy trait shared by every engine

use crate::data::CandleSeries;
use crate::error::{Hook, StrategyError};
use crate::portfolio::Wallet;
use crate::snapshot::Info;
use crate::strategy::Signal;
use crate::tune::Tune;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Indicator series keyed by name, right-aligned with the market data
pub type Indicators = BTreeMap<String, Vec<f64>>;

/// Extra parameters for one fitness metric
pub type MetricParams = BTreeMap<String, f64>;

/// Metrics an optimizer should use to rank a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    /// Metric names, in priority order
    pub metrics: Vec<String>,
    /// Per-metric parameters
    pub params: BTreeMap<String, MetricParams>,
}

impl Fitness {
    pub fn new<I, S>(metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metrics: metrics.into_iter().map(Into::into).collect(),
            params: BTreeMap::new(),
        }
    }

    /// Return on investment only
    pub fn roi() -> Self {
        Self::new(["roi"])
    }

    /// Attach a parameter to a metric
    pub fn with_param(mut self, metric: &str, key: &str, value: f64) -> Self {
        self.params
            .entry(metric.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self
    }

    pub fn param(&self, metric: &str, key: &str) -> Option<f64> {
        self.params.get(metric)?.get(key).copied()
    }
}

impl Default for Fitness {
    fn default() -> Self {
        Self::roi()
    }
}

/// Hooks a strategy declares it implements.
///
/// Engines check this when a strategy is registered, before calling any hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub indicators: bool,
    pub strategy: bool,
    pub plot: bool,
}

impl Capabilities {
    /// Both mandatory hooks, no custom plot
    pub const fn core() -> Self {
        Self {
            indicators: true,
            strategy: true,
            plot: false,
        }
    }

    pub const fn with_plot(mut self) -> Self {
        self.plot = true;
        self
    }

    pub fn has(&self, hook: Hook) -> bool {
        match hook {
            Hook::Indicators => self.indicators,
            Hook::Strategy => self.strategy,
            Hook::Plot => self.plot,
        }
    }

    /// Mandatory hooks that are not declared
    pub fn missing_mandatory(&self) -> Vec<Hook> {
        [Hook::Indicators, Hook::Strategy]
            .into_iter()
            .filter(|hook| !self.has(*hook))
            .collect()
    }
}

/// Base trait for all trading strategies.
///
/// Every hook runs synchronously on one instance at a time. Hooks that may
/// touch instance storage take `&mut self`; the rest take `&self` and must not
/// have side effects.
///
/// A minimal strategy implements [`name`](Strategy::name), the tune accessors,
/// [`indicators`](Strategy::indicators), [`strategy`](Strategy::strategy) and
/// declares [`Capabilities::core`].
pub trait Strategy {
    /// Get strategy name
    fn name(&self) -> &str;

    /// Tunable parameters
    fn tune(&self) -> &Tune;

    /// Mutable access for optimizers between runs
    fn tune_mut(&mut self) -> &mut Tune;

    /// Implemented hooks. Defaults to none.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Warm-up periods needed before indicators are valid
    fn autorange(&self) -> u32 {
        self.tune().autorange()
    }

    /// Compute indicator series from market data
    fn indicators(&mut self, _data: &CandleSeries) -> Result<Indicators, StrategyError> {
        Err(StrategyError::NotImplemented(Hook::Indicators))
    }

    /// Decide what to do this cycle
    fn strategy(&mut self, _state: &Info, _indicators: &Info) -> Result<Signal, StrategyError> {
        Err(StrategyError::NotImplemented(Hook::Strategy))
    }

    /// Amount of `currency_balance` to commit to the next buy.
    ///
    /// Defaults to the whole balance, which is risky; real strategies should
    /// override this.
    fn get_trade_amount(&self, currency_balance: f64) -> f64 {
        currency_balance
    }

    /// Clear instance-owned caches. Defaults to a no-op.
    fn reset(&mut self) {}

    /// Adjust or veto a raw decision before the engine acts on it
    fn execution(&self, signal: Signal, _indicators: &Info, _wallet: &Wallet) -> Signal {
        signal
    }

    /// Metrics used to rank a completed run
    fn fitness(
        &self,
        _states: &[Info],
        _raw_states: &[Info],
        _asset: &str,
        _currency: &str,
    ) -> Fitness {
        Fitness::roi()
    }

    /// Custom visualization
    fn plot(
        &self,
        _data: &CandleSeries,
        _states: &[Info],
        _indicators: &Indicators,
        _block: bool,
    ) -> Result<(), StrategyError> {
        Err(StrategyError::NotImplemented(Hook::Plot))
    }
}

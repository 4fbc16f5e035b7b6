//! EMA crossover strategy

use crate::data::CandleSeries;
use crate::error::StrategyError;
use crate::indicators::{calculate_ema, period_from_tune};
use crate::snapshot::Info;
use crate::strategy::{Capabilities, Indicators, Signal, Strategy};
use crate::tune::Tune;
use tracing::{debug, info};

pub const FAST_EMA: &str = "fast_ema";
pub const SLOW_EMA: &str = "slow_ema";

/// Buys when the fast EMA crosses above the slow EMA and sells on the
/// opposite cross.
///
/// Tune keys: `fast_period`, `slow_period`, `trade_fraction`.
#[derive(Debug, Clone)]
pub struct EmaCross {
    tune: Tune,
    /// Previous (fast, slow) pair, cleared by `reset`
    last: Option<(f64, f64)>,
}

impl EmaCross {
    pub fn new(tune: Tune) -> Self {
        Self { tune, last: None }
    }

    fn trade_fraction(&self) -> f64 {
        self.tune.get_or("trade_fraction", 0.5).clamp(0.0, 1.0)
    }
}

impl Default for EmaCross {
    fn default() -> Self {
        Self::new(
            Tune::new()
                .with("fast_period", 10.0)
                .with("slow_period", 30.0)
                .with("trade_fraction", 0.5),
        )
    }
}

impl Strategy for EmaCross {
    fn name(&self) -> &str {
        "EMA Cross"
    }

    fn tune(&self) -> &Tune {
        &self.tune
    }

    fn tune_mut(&mut self) -> &mut Tune {
        &mut self.tune
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::core()
    }

    fn indicators(&mut self, data: &CandleSeries) -> Result<Indicators, StrategyError> {
        let closes = data.closes();
        let fast = period_from_tune(self.tune.get_or("fast_period", 10.0));
        let slow = period_from_tune(self.tune.get_or("slow_period", 30.0));

        let mut indicators = Indicators::new();
        // Periods are at least 1, which ta always accepts
        if let (Ok(fast_ema), Ok(slow_ema)) = (calculate_ema(&closes, fast), calculate_ema(&closes, slow)) {
            indicators.insert(FAST_EMA.to_string(), fast_ema);
            indicators.insert(SLOW_EMA.to_string(), slow_ema);
        }
        Ok(indicators)
    }

    fn strategy(&mut self, _state: &Info, indicators: &Info) -> Result<Signal, StrategyError> {
        let fast = indicators.lookup(FAST_EMA)?;
        let slow = indicators.lookup(SLOW_EMA)?;

        let signal = match self.last {
            Some((prev_fast, prev_slow)) if fast > slow && prev_fast <= prev_slow => Signal::Buy,
            Some((prev_fast, prev_slow)) if fast < slow && prev_fast >= prev_slow => Signal::Sell,
            _ => Signal::Hold,
        };
        self.last = Some((fast, slow));

        if signal.is_actionable() {
            info!(%signal, fast, slow, "EMA crossover");
        } else {
            debug!(fast, slow, "no crossover");
        }
        Ok(signal)
    }

    fn get_trade_amount(&self, currency_balance: f64) -> f64 {
        currency_balance * self.trade_fraction()
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

//! RSI band strategy

use crate::data::CandleSeries;
use crate::error::StrategyError;
use crate::indicators::{calculate_rsi, period_from_tune};
use crate::portfolio::Wallet;
use crate::snapshot::Info;
use crate::strategy::{Capabilities, Fitness, Indicators, Signal, Strategy};
use crate::tune::Tune;
use tracing::debug;

pub const RSI_KEY: &str = "rsi";

/// Buys while RSI is below `oversold` and exits while it is above `overbought`.
///
/// Decisions that the wallet cannot act on are vetoed in `execution`, so the
/// engine never sees a buy without currency or a sell without assets.
#[derive(Debug, Clone)]
pub struct RsiBand {
    tune: Tune,
}

impl RsiBand {
    pub fn new(tune: Tune) -> Self {
        Self { tune }
    }
}

impl Default for RsiBand {
    fn default() -> Self {
        Self::new(
            Tune::new()
                .with("rsi_period", 14.0)
                .with("oversold", 30.0)
                .with("overbought", 70.0),
        )
    }
}

impl Strategy for RsiBand {
    fn name(&self) -> &str {
        "RSI Band"
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
        let period = period_from_tune(self.tune.get_or("rsi_period", 14.0));
        let mut indicators = Indicators::new();
        if let Ok(rsi) = calculate_rsi(&data.closes(), period) {
            indicators.insert(RSI_KEY.to_string(), rsi);
        }
        Ok(indicators)
    }

    fn strategy(&mut self, _state: &Info, indicators: &Info) -> Result<Signal, StrategyError> {
        let rsi = indicators.lookup(RSI_KEY)?;
        let signal = if rsi < self.tune.get_or("oversold", 30.0) {
            Signal::Buy
        } else if rsi > self.tune.get_or("overbought", 70.0) {
            Signal::Sell
        } else {
            Signal::Hold
        };
        Ok(signal)
    }

    fn execution(&self, signal: Signal, indicators: &Info, wallet: &Wallet) -> Signal {
        let vetoed = match signal {
            Signal::Buy => wallet.has_assets() || wallet.currency <= 0.0,
            Signal::Sell => !wallet.has_assets(),
            Signal::Hold => false,
        };
        if vetoed {
            debug!(%signal, rsi = ?indicators.get(RSI_KEY), "signal vetoed by wallet state");
            Signal::Hold
        } else {
            signal
        }
    }

    fn fitness(&self, _states: &[Info], _raw_states: &[Info], _asset: &str, _currency: &str) -> Fitness {
        Fitness::new(["roi", "sortino_ratio", "win_rate"]).with_param("sortino_ratio", "risk_free", 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsi(value: f64) -> Info {
        Info::builder().with(RSI_KEY, value).publish()
    }

    #[test]
    fn test_band_decisions() {
        let mut strategy = RsiBand::default();
        let state = Info::default();
        assert_eq!(strategy.strategy(&state, &rsi(20.0)).unwrap(), Signal::Buy);
        assert_eq!(strategy.strategy(&state, &rsi(50.0)).unwrap(), Signal::Hold);
        assert_eq!(strategy.strategy(&state, &rsi(80.0)).unwrap(), Signal::Sell);
    }

    #[test]
    fn test_execution_vetoes_by_wallet() {
        let strategy = RsiBand::default();
        let flat = Wallet::new(0.0, 100.0);
        let holding = Wallet::new(1.0, 0.0);
        let ind = rsi(20.0);

        assert_eq!(strategy.execution(Signal::Buy, &ind, &flat), Signal::Buy);
        assert_eq!(strategy.execution(Signal::Buy, &ind, &holding), Signal::Hold);
        assert_eq!(strategy.execution(Signal::Sell, &ind, &flat), Signal::Hold);
        assert_eq!(strategy.execution(Signal::Sell, &ind, &holding), Signal::Sell);
        assert_eq!(strategy.execution(Signal::Hold, &ind, &holding), Signal::Hold);
    }

    #[test]
    fn test_fitness_metrics() {
        let fitness = RsiBand::default().fitness(&[], &[], "BTC", "USDT");
        assert_eq!(fitness.metrics, vec!["roi", "sortino_ratio", "win_rate"]);
        assert_eq!(fitness.param("sortino_ratio", "risk_free"), Some(0.0));
    }
}

//! Trading decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision produced by a strategy each cycle.
///
/// Carries no sizing or execution detail; the engine decides how to act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Signal {
    /// Buy/Long signal
    Buy,
    /// Sell/Exit signal
    Sell,
    /// No action
    #[default]
    Hold,
}

impl Signal {
    /// Whether the engine has anything to do
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Hold)
    }

    /// Value recorded in trade states: 1 for buys, -1 for sells, 0 otherwise
    pub fn direction(&self) -> f64 {
        match self {
            Signal::Buy => 1.0,
            Signal::Sell => -1.0,
            Signal::Hold => 0.0,
        }
    }
}

impl From<Option<Signal>> for Signal {
    fn from(signal: Option<Signal>) -> Self {
        signal.unwrap_or(Signal::Hold)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(name)
    }
}

//! Technical indicators module
//!
//! Thin wrappers over the `ta` crate. Series helpers return only the values
//! produced once an indicator is ready, so they come out right-aligned with
//! the input data, which is the layout `Strategy::indicators` must return.

pub mod ema;
pub mod rsi;

pub use ema::*;
pub use rsi::*;

/// Indicator trait for all indicators
pub trait Indicator {
    /// Get the name of the indicator
    fn name(&self) -> &str;

    /// Update indicator with new value
    fn update(&mut self, value: f64);

    /// Get current indicator value
    fn value(&self) -> Option<f64>;

    /// Check if indicator is ready (has enough data)
    fn is_ready(&self) -> bool;
}

/// Feed `values` through an indicator, keeping only ready outputs
pub fn ready_series<I: Indicator>(mut indicator: I, values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|&value| {
            indicator.update(value);
            indicator.value()
        })
        .collect()
}

/// Convert a tune value into an indicator period of at least 1
pub fn period_from_tune(value: f64) -> usize {
    if value.is_finite() {
        value.round().max(1.0) as usize
    } else {
        1
    }
}

//! Market data module
//!
//! OHLCV candles and the series handed to `Strategy::indicators`.

pub mod candle;

pub use candle::*;

//! Strategy implementations

pub mod ema_cross;
pub mod rsi_band;

pub use ema_cross::*;
pub use rsi_band::*;

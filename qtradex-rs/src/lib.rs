//! QTradeX-RS: the strategy contract shared by QTradeX engines
//!
//! Backtester, live trader and parameter optimizer all drive strategies through
//! the same [`Strategy`](strategy::Strategy) trait, so none of them needs to know
//! what a concrete strategy does internally.
//!
//! # Features
//!
//! - **Strategy Contract**: indicator, decision, sizing, execution and fitness hooks
//! - **Read-only Snapshots**: [`Info`](snapshot::Info) values published by engines
//! - **Warm-up Inference**: derived from `*_period` tune parameters
//! - **Backtesting**: reference single-asset engine with fitness metrics
//! - **Candidate Evaluation**: parallel scoring of tune candidates via rayon
//!
//! # Example
//!
//! ```no_run
//! use qtradex_rs::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let series = CandleSeries::new();
//!     let mut strategy = EmaCross::default();
//!     let engine = BacktestEngine::new(BacktestConfig::from_env()?);
//!     let result = engine.run(&mut strategy, &series)?;
//!     println!("{}", BacktestReport::new(result).format());
//!     Ok(())
//! }
//! ```

pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod optimize;
pub mod portfolio;
pub mod snapshot;
pub mod strategy;
pub mod tune;

// Re-export commonly used types
pub mod prelude {
    pub use crate::backtest::*;
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::error::*;
    pub use crate::indicators::*;
    pub use crate::optimize::*;
    pub use crate::portfolio::*;
    pub use crate::snapshot::*;
    pub use crate::strategy::*;
    pub use crate::tune::*;

    pub use anyhow::{Context, Result};
}

/// Result type alias
pub type Result<T> = anyhow::Result<T>;

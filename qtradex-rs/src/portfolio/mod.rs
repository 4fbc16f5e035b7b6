//! Portfolio management module

pub mod wallet;

pub use wallet::*;

//! Strategy contract module
//!
//! Provides the strategy trait, decisions, registration checks and example strategies.

pub mod base;
pub mod signal;
pub mod validator;
pub mod implementations;

pub use base::*;
pub use signal::*;
pub use validator::*;
pub use implementations::*;

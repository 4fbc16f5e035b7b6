//! Contract violations raised by strategies, snapshots and the registration check

use std::fmt;
use thiserror::Error;

/// Strategy hooks that may be left unimplemented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Indicators,
    Strategy,
    Plot,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hook::Indicators => "indicators",
            Hook::Strategy => "strategy",
            Hook::Plot => "plot",
        };
        f.write_str(name)
    }
}

/// Errors defined by the strategy contract.
///
/// None of these are transient. An engine that receives one must stop the
/// offending evaluation and report it, never retry it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("strategy hook `{0}` is not implemented")]
    NotImplemented(Hook),

    #[error("strategy has an empty name")]
    Unnamed,

    #[error("strategy `{name}` is incomplete, missing hooks: {missing:?}")]
    Incomplete { name: String, missing: Vec<Hook> },

    #[error("snapshot is read-only, refused write to `{key}`")]
    ImmutableState { key: String },

    #[error("key `{key}` not found")]
    MissingKey { key: String },

    #[error("invalid tune parameter `{key}`: {reason}")]
    InvalidTune { key: String, reason: String },
}

impl StrategyError {
    /// Missing-key helper
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// True for errors that mean the calling code is wrong.
    ///
    /// Only a missing plot hook is excused, since plotting collaborators fall
    /// back to their default rendering.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, StrategyError::NotImplemented(Hook::Plot))
    }
}

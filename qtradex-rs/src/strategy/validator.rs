//! Strategy validation

use crate::error::StrategyError;
use crate::strategy::Strategy;
use tracing::debug;

/// Registration-time checks run before an engine calls any hook
pub struct StrategyValidator;

impl StrategyValidator {
    /// Validate a strategy before a run
    pub fn validate<S: Strategy + ?Sized>(strategy: &S) -> Result<(), StrategyError> {
        let name = strategy.name();
        if name.is_empty() {
            return Err(StrategyError::Unnamed);
        }

        let missing = strategy.capabilities().missing_mandatory();
        if !missing.is_empty() {
            return Err(StrategyError::Incomplete {
                name: name.to_string(),
                missing,
            });
        }

        strategy.tune().validate()?;

        debug!(strategy = name, autorange = strategy.autorange(), "strategy validated");
        Ok(())
    }
}

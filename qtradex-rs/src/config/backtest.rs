//! Backtest configuration

use crate::Result;
use anyhow::Context;
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Backtest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Traded asset symbol (e.g., "BTC")
    pub asset: String,
    /// Quote currency symbol (e.g., "USDT")
    pub currency: String,
    /// Starting asset balance
    pub initial_assets: f64,
    /// Starting currency balance
    pub initial_currency: f64,
    /// Fee charged per fill (e.g., 0.001 = 0.1%)
    pub fee: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            asset: "BTC".to_string(),
            currency: "USDT".to_string(),
            initial_assets: 0.0,
            initial_currency: 1000.0,
            fee: 0.001,
        }
    }
}

impl BacktestConfig {
    /// Load from `QTRADEX_*` environment variables, falling back to defaults.
    ///
    /// Reads a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            asset: std::env::var("QTRADEX_ASSET").unwrap_or(defaults.asset),
            currency: std::env::var("QTRADEX_CURRENCY").unwrap_or(defaults.currency),
            initial_assets: env_or("QTRADEX_INITIAL_ASSETS", defaults.initial_assets)?,
            initial_currency: env_or("QTRADEX_INITIAL_CURRENCY", defaults.initial_currency)?,
            fee: env_or("QTRADEX_FEE", defaults.fee)?,
        })
    }

    /// Parse from a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse backtest config")
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_partial_config() {
        let config = BacktestConfig::from_json(r#"{"asset": "ETH", "fee": 0.0}"#).unwrap();
        assert_eq!(config.asset, "ETH");
        assert_eq!(config.fee, 0.0);
        assert_eq!(config.currency, "USDT");
        assert_eq!(config.initial_currency, 1000.0);
    }

    #[test]
    fn test_env_parsing() {
        std::env::set_var("QTRADEX_TEST_FEE_OK", "0.002");
        assert_eq!(env_or("QTRADEX_TEST_FEE_OK", 0.0).unwrap(), 0.002);

        std::env::set_var("QTRADEX_TEST_FEE_BAD", "lots");
        assert!(env_or("QTRADEX_TEST_FEE_BAD", 0.0).is_err());

        assert_eq!(env_or("QTRADEX_TEST_UNSET", 7.5).unwrap(), 7.5);
    }
}

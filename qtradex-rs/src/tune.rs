//! Tunable strategy parameters

use crate::error::StrategyError;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Suffix marking a tune key as a lookback window
pub const PERIOD_SUFFIX: &str = "_period";

/// Mapping from parameter name to numeric value.
///
/// Keys ending in [`PERIOD_SUFFIX`] are lookback windows measured in the units
/// of the data's time index (days by convention).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tune {
    params: BTreeMap<String, f64>,
}

impl Tune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.params.get(key).copied()
    }

    /// Get a parameter, falling back to `default` when absent
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Insert or replace a parameter, returning the previous value
    pub fn set(&mut self, key: impl Into<String>, value: f64) -> Option<f64> {
        self.params.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.params.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.params.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Values of every `*_period` key
    pub fn periods(&self) -> impl Iterator<Item = f64> + '_ {
        self.params
            .iter()
            .filter(|(k, _)| k.ends_with(PERIOD_SUFFIX))
            .map(|(_, v)| *v)
    }

    /// Warm-up requirement: ceiling of the largest `*_period` value, or 0.
    ///
    /// Non-finite values are skipped and a negative maximum counts as 0.
    /// Recomputed on every call so optimizer mutations are always reflected.
    pub fn autorange(&self) -> u32 {
        self.periods()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
            .map(|max| max.ceil().max(0.0) as u32)
            .unwrap_or(0)
    }

    /// Reject non-finite values
    pub fn validate(&self) -> std::result::Result<(), StrategyError> {
        match self.params.iter().find(|(_, v)| !v.is_finite()) {
            Some((key, value)) => Err(StrategyError::InvalidTune {
                key: key.clone(),
                reason: format!("value {value} is not finite"),
            }),
            None => Ok(()),
        }
    }

    /// Parse a tune from a JSON object such as `{"fast_period": 12.0}`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse tune JSON")
    }

    /// Load a tune from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tune file {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to serialize tune")
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Tune {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

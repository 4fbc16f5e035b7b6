//! Read-only state snapshots
//!
//! Engines publish market state and per-tick indicator values to strategies as
//! [`Info`] values. Only the owner holding a [`SnapshotBuilder`] can write; once
//! published an `Info` has no mutation path reachable through a shared
//! reference, so the same snapshot can be handed to many strategy instances.

use crate::error::StrategyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// Immutable key-value view over computed state
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Info {
    data: BTreeMap<String, f64>,
}

impl Info {
    /// Start building a snapshot
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Look up a value, failing with [`StrategyError::MissingKey`] if absent
    pub fn lookup(&self, key: &str) -> Result<f64, StrategyError> {
        self.data
            .get(key)
            .copied()
            .ok_or_else(|| StrategyError::missing(key))
    }

    /// Look up a value without failing
    pub fn get(&self, key: &str) -> Option<f64> {
        self.data.get(key).copied()
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Writes are always refused.
    ///
    /// A published snapshot is never modified. Code that reaches this has a
    /// bug and must propagate the error rather than retry.
    pub fn insert(&self, key: &str, _value: f64) -> Result<(), StrategyError> {
        Err(StrategyError::ImmutableState {
            key: key.to_string(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.data.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reclaim the snapshot for another round of updates.
    ///
    /// Takes the snapshot by value, so it is only possible once every
    /// reference handed to strategy code has been dropped.
    pub fn into_builder(self) -> SnapshotBuilder {
        SnapshotBuilder { data: self.data }
    }
}

impl fmt::Debug for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.data, f)
    }
}

/// Panics if the key is absent. Use [`Info::lookup`] to get an error instead.
impl Index<&str> for Info {
    type Output = f64;

    fn index(&self, key: &str) -> &f64 {
        match self.data.get(key) {
            Some(value) => value,
            None => panic!("key `{key}` not found in snapshot"),
        }
    }
}

impl From<BTreeMap<String, f64>> for Info {
    fn from(data: BTreeMap<String, f64>) -> Self {
        Self { data }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Info {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Privileged write access to a snapshot before it is published
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    data: BTreeMap<String, f64>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite a value
    pub fn set(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Chainable variant of [`SnapshotBuilder::set`]
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Freeze the staged values into an [`Info`]
    pub fn publish(self) -> Info {
        Info { data: self.data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn price_snapshot() -> Info {
        Info::builder().with("price", 100.0).publish()
    }

    #[test]
    fn test_lookup_and_contains() {
        let info = price_snapshot();
        assert_eq!(info.lookup("price").unwrap(), 100.0);
        assert_eq!(info["price"], 100.0);
        assert!(info.contains_key("price"));
        assert!(!info.contains_key("volume"));
    }

    #[test]
    fn test_missing_key() {
        let info = price_snapshot();
        assert_eq!(
            info.lookup("volume"),
            Err(StrategyError::MissingKey { key: "volume".to_string() })
        );
        assert_eq!(info.get("volume"), None);
    }

    #[test]
    #[should_panic(expected = "key `volume` not found")]
    fn test_index_panics_on_missing_key() {
        let info = price_snapshot();
        let _ = info["volume"];
    }

    #[test]
    fn test_write_is_refused() {
        let info = price_snapshot();
        let err = info.insert("price", 1.0).unwrap_err();
        assert_eq!(err, StrategyError::ImmutableState { key: "price".to_string() });
        assert_eq!(info.lookup("price").unwrap(), 100.0);

        // New keys are refused as well
        assert!(info.insert("volume", 5.0).is_err());
        assert!(!info.contains_key("volume"));
    }

    #[test]
    fn test_owner_update_cycle() {
        let mut builder = price_snapshot().into_builder();
        builder.set("price", 101.0).set("volume", 7.0);
        let info = builder.publish();
        assert_eq!(info.lookup("price").unwrap(), 101.0);
        assert_eq!(info.len(), 2);
        assert_eq!(info.keys().collect::<Vec<_>>(), vec!["price", "volume"]);
    }

    #[test]
    fn test_shared_snapshot_cannot_be_reclaimed() {
        let shared = Arc::new(price_snapshot());
        let other = Arc::clone(&shared);
        let shared = Arc::try_unwrap(shared).unwrap_err();
        assert_eq!(other.lookup("price").unwrap(), 100.0);
        drop(other);
        let info = Arc::try_unwrap(shared).unwrap();
        assert_eq!(info.into_builder().publish().len(), 1);
    }

    #[test]
    fn test_debug_shows_inner_map() {
        let info: Info = [("a", 1.0), ("b", 2.0)].into_iter().collect();
        assert_eq!(format!("{:?}", info), r#"{"a": 1.0, "b": 2.0}"#);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let info = price_snapshot();
        assert_eq!(serde_json::to_string(&info).unwrap(), r#"{"price":100.0}"#);
    }
}

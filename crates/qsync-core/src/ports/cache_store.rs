//! Key/value cache store port.
//!
//! The store is the only coordination point of the pipeline: listings, raw
//! items, fetch checkpoints and artifacts all live here under keys built by
//! [`crate::keys`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::StoreError;

/// Durable key/value store with glob-style key scans.
///
/// Patterns use `*` as a wildcard matching any run of characters (including
/// `:`). Keys built by [`crate::keys`] never contain other glob
/// metacharacters.
///
/// Per-key `get`/`set`/`delete` must be atomic.
#[async_trait]
pub trait CacheStorePort: Send + Sync {
    /// Read a value. Expired entries read as absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a value, replacing any previous one. `ttl = None` never expires.
    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// All live keys matching `pattern`, in no particular order.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Delete every key matching `pattern`. Returns the number removed.
    async fn delete_by_prefix(&self, pattern: &str) -> Result<u64, StoreError>;

    /// Delete one key. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// Read and deserialize a typed value.
pub async fn load<T: DeserializeOwned>(
    store: &dyn CacheStorePort,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Serialization(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

/// Serialize and write a typed value.
pub async fn save<T: Serialize + Sync>(
    store: &dyn CacheStorePort,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> Result<(), StoreError> {
    let value =
        serde_json::to_value(value).map_err(|e| StoreError::Serialization(format!("{key}: {e}")))?;
    store.set(key, &value, ttl).await
}

//! `SQLite` implementation of the `CacheStorePort` trait.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Row, SqlitePool};

use qsync_core::{CacheStorePort, StoreError};

/// Key/value cache backed by the `cache_entries` table.
///
/// Values are stored as JSON text. Expiry is an absolute unix timestamp in
/// milliseconds; `NULL` never expires. Pattern scans use `GLOB`.
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ensure the cache table and its expiry index exist.
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                expires_at INTEGER,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_cache_entries_expires ON cache_entries(expires_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Delete every expired row. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result =
            sqlx::query("DELETE FROM cache_entries WHERE expires_at IS NOT NULL AND expires_at <= ?")
                .bind(now_millis())
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Storage(e.to_string()))?;

        let removed = result.rows_affected();
        if removed > 0 {
            tracing::debug!(target: "qsync.db", removed, "Purged expired cache entries");
        }
        Ok(removed)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn expiry(ttl: Option<Duration>) -> Option<i64> {
    ttl.map(|ttl| now_millis().saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)))
}

#[async_trait]
impl CacheStorePort for SqliteCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query(
            "SELECT value FROM cache_entries WHERE key = ? AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(key)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        match row {
            Some(r) => {
                let json: String = r.get("value");
                serde_json::from_str(&json)
                    .map(Some)
                    .map_err(|e| StoreError::Serialization(format!("{key}: {e}")))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)
            .map_err(|e| StoreError::Serialization(format!("{key}: {e}")))?;
        let updated_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT OR REPLACE INTO cache_entries (key, value, expires_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(key)
        .bind(&json)
        .bind(expiry(ttl))
        .bind(&updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            "SELECT key FROM cache_entries WHERE key GLOB ? AND (expires_at IS NULL OR expires_at > ?) ORDER BY key",
        )
        .bind(pattern)
        .bind(now_millis())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(rows.iter().map(|r| r.get::<String, _>("key")).collect())
    }

    async fn delete_by_prefix(&self, pattern: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE key GLOB ?")
            .bind(pattern)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

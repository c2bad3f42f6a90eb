//! Composition utilities for building core services with `SQLite` backends.
//!
//! Construction only; no domain logic.

use sqlx::SqlitePool;
use std::sync::Arc;

use qsync_core::Stores;

use crate::repositories::{SqliteCacheStore, SqliteSettingsRepository};

/// Factory for creating store instances with `SQLite` backends.
pub struct StoreFactory;

impl StoreFactory {
    /// Build every `SQLite` adapter from a pool.
    ///
    /// Returns the `Stores` container from `qsync-core` with trait-object
    /// wrapped adapters.
    pub fn build_stores(pool: SqlitePool) -> Stores {
        Stores::new(
            Arc::new(SqliteCacheStore::new(pool.clone())),
            Arc::new(SqliteSettingsRepository::new(pool)),
        )
    }

    pub fn cache_store(pool: SqlitePool) -> Arc<SqliteCacheStore> {
        Arc::new(SqliteCacheStore::new(pool))
    }

    pub fn settings_repository(pool: SqlitePool) -> Arc<SqliteSettingsRepository> {
        Arc::new(SqliteSettingsRepository::new(pool))
    }
}

/// In-memory database with the production schema, for tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn cache_store(&self) -> SqliteCacheStore {
        SqliteCacheStore::new(self.pool.clone())
    }

    pub fn settings_repository(&self) -> SqliteSettingsRepository {
        SqliteSettingsRepository::new(self.pool.clone())
    }

    pub fn stores(&self) -> Stores {
        StoreFactory::build_stores(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsync_core::CacheStorePort;
    use serde_json::json;

    #[tokio::test]
    async fn test_build_stores_share_one_database() {
        let db = TestDb::new().await.unwrap();
        let stores = db.stores();

        stores.cache.set("k", &json!(1), None).await.unwrap();
        assert_eq!(db.cache_store().get("k").await.unwrap(), Some(json!(1)));

        let settings = stores.settings.load().await.unwrap();
        assert_eq!(settings.source_batch_size, Some(100));
    }
}

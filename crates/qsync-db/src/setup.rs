//! Database setup and initialization.
//!
//! Entry points call [`setup_database`] with the resolved database path.

use anyhow::Result;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use std::path::Path;

use crate::repositories::{SqliteCacheStore, SqliteSettingsRepository};

/// Open (creating if needed) the `SQLite` database and ensure the schema.
///
/// Safe to call on every start: all schema statements use `IF NOT EXISTS`.
///
/// # Example
///
/// ```rust,no_run
/// use qsync_db::setup_database;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = setup_database(Path::new("/path/to/qsync.db")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true),
    )
    .await?;

    create_schema(&pool).await?;
    tracing::debug!(target: "qsync.db", path = %db_path.display(), "Database ready");

    Ok(pool)
}

/// Sets up an in-memory `SQLite` database with the production schema.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = SqlitePool::connect("sqlite::memory:").await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Creates every table and index the adapters need.
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    SqliteCacheStore::new(pool.clone()).ensure_table().await?;
    SqliteSettingsRepository::new(pool.clone())
        .ensure_table()
        .await?;
    Ok(())
}

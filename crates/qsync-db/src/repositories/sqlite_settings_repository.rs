//! `SQLite` implementation of the `SettingsRepository` trait.
//!
//! One row per setting that has a value; an unset field has no row. Rows
//! for names this build does not know are ignored on load, so a database
//! written by a newer qsync stays readable.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};

use qsync_core::{Settings, SettingsRepository, StoreError};

pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS pipeline_settings (
                name TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }
}

fn storage(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn serialization(name: &str, e: &serde_json::Error) -> StoreError {
    StoreError::Serialization(format!("setting {name}: {e}"))
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn load(&self) -> Result<Settings, StoreError> {
        let rows = sqlx::query("SELECT name, value FROM pipeline_settings")
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        if rows.is_empty() {
            return Ok(Settings::with_defaults());
        }

        let mut fields = Map::new();
        for row in rows {
            let name: String = row.get("name");
            let raw: String = row.get("value");
            let value: Value = serde_json::from_str(&raw).map_err(|e| serialization(&name, &e))?;
            fields.insert(name, value);
        }
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| StoreError::Serialization(format!("settings: {e}")))
    }

    async fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let Value::Object(fields) = serde_json::to_value(settings)
            .map_err(|e| StoreError::Serialization(format!("settings: {e}")))?
        else {
            return Err(StoreError::Serialization(
                "settings did not serialize to an object".to_string(),
            ));
        };

        let mut tx = self.pool.begin().await.map_err(storage)?;
        sqlx::query("DELETE FROM pipeline_settings")
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        for (name, value) in fields.iter().filter(|(_, value)| !value.is_null()) {
            sqlx::query("INSERT INTO pipeline_settings (name, value) VALUES (?, ?)")
                .bind(name)
                .bind(value.to_string())
                .execute(&mut *tx)
                .await
                .map_err(storage)?;
        }
        tx.commit().await.map_err(storage)?;

        tracing::debug!(target: "qsync.db", "Saved pipeline settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteSettingsRepository {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let repo = SqliteSettingsRepository::new(pool);
        repo.ensure_table().await.unwrap();
        repo
    }

    async fn names(repo: &SqliteSettingsRepository) -> Vec<String> {
        sqlx::query("SELECT name FROM pipeline_settings ORDER BY name")
            .fetch_all(&repo.pool)
            .await
            .unwrap()
            .iter()
            .map(|row| row.get("name"))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_table_loads_defaults() {
        assert_eq!(repo().await.load().await.unwrap(), Settings::with_defaults());
    }

    #[tokio::test]
    async fn test_unset_fields_have_no_row_and_stay_unset() {
        let repo = repo().await;
        let settings = Settings {
            source_batch_size: Some(25),
            default_output: Some("skip".to_string()),
            ..Settings::default()
        };

        repo.save(&settings).await.unwrap();
        assert_eq!(names(&repo).await, vec!["default_output", "source_batch_size"]);
        assert_eq!(repo.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_rows() {
        let repo = repo().await;
        repo.save(&Settings::with_defaults()).await.unwrap();
        repo.save(&Settings {
            listing_ttl_secs: Some(60),
            ..Settings::default()
        })
        .await
        .unwrap();

        assert_eq!(names(&repo).await, vec!["listing_ttl_secs"]);
        assert_eq!(repo.load().await.unwrap().fetch_no_progress_limit, None);
    }

    #[tokio::test]
    async fn test_unknown_rows_are_ignored() {
        let repo = repo().await;
        sqlx::query("INSERT INTO pipeline_settings (name, value) VALUES ('from_the_future', '1'), ('finish_delay_ms', '5')")
            .execute(&repo.pool)
            .await
            .unwrap();
        assert_eq!(repo.load().await.unwrap().finish_delay_ms, Some(5));
    }
}

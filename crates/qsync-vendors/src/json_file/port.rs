//! Port implementations for `JsonFileSource`.
//!
//! Internal errors become `SourceError` here and nowhere else.

use async_trait::async_trait;
use qsync_core::{
    Bank, Category, CatalogPort, FetchedItem, Sheet, SheetCoordinate, SourceBatch, SourceError,
    SourcePort,
};
use serde_json::{Value, json};

use super::JsonFileSource;

/// The only sheet of every category.
const DEFAULT_SHEET_ID: &str = "0";
const DEFAULT_SHEET_NAME: &str = "default";

#[async_trait]
impl SourcePort for JsonFileSource {
    async fn list_batch(&self, sheet: &SheetCoordinate) -> Result<SourceBatch, SourceError> {
        let batch = self.lease(sheet).await?;
        tracing::debug!(
            target: "qsync.vendor",
            sheet = %sheet,
            batch_id = %batch.batch_id,
            items = batch.item_ids.len(),
            "Leased batch"
        );
        Ok(batch)
    }

    async fn fetch_items(
        &self,
        _sheet: &SheetCoordinate,
        ids: &[String],
    ) -> Result<Vec<FetchedItem>, SourceError> {
        Ok(self.details(ids))
    }

    async fn acknowledge(
        &self,
        batch_id: &str,
        item_id: &str,
        index: usize,
    ) -> Result<(), SourceError> {
        Ok(self.record_ack(batch_id, item_id, index).await?)
    }

    async fn close_batch(&self, batch_id: &str) -> Result<(), SourceError> {
        Ok(self.record_close(batch_id).await?)
    }
}

#[async_trait]
impl CatalogPort for JsonFileSource {
    async fn login(&self, username: &str, password: &str) -> Result<Value, SourceError> {
        if password.is_empty() {
            return Err(SourceError::Auth("password must not be empty".to_string()));
        }
        Ok(json!({
            "username": username,
            "document": self.config().path().display().to_string(),
        }))
    }

    async fn list_banks(&self) -> Result<Vec<Bank>, SourceError> {
        Ok(self.document.banks())
    }

    async fn list_categories(&self, bank: &Bank) -> Result<Vec<Category>, SourceError> {
        Ok(self.document.categories(&bank.id)?)
    }

    async fn list_sheets(
        &self,
        bank: &Bank,
        category: &Category,
    ) -> Result<Vec<Sheet>, SourceError> {
        let count = self.document.count(&bank.id, &category.id)?;
        Ok(vec![Sheet {
            id: DEFAULT_SHEET_ID.to_string(),
            name: DEFAULT_SHEET_NAME.to_string(),
            count,
            order: 0,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_file::JsonFileConfig;
    use crate::json_file::document::fixtures;

    async fn source(dir: &std::path::Path) -> JsonFileSource {
        let path = dir.join("bank.json");
        std::fs::write(&path, fixtures::document().to_string()).unwrap();
        JsonFileSource::open(JsonFileConfig::new(path)).await.unwrap()
    }

    #[tokio::test]
    async fn test_catalog_listings() {
        let tmp = tempfile::tempdir().unwrap();
        let source = source(tmp.path()).await;

        let banks = source.list_banks().await.unwrap();
        assert_eq!(banks[0].name, "Psychology");

        let categories = source.list_categories(&banks[0]).await.unwrap();
        assert_eq!(categories.len(), 2);

        let sheets = source.list_sheets(&banks[0], &categories[0]).await.unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].id, "0");
        assert_eq!(sheets[0].count, 3);
    }

    #[tokio::test]
    async fn test_unknown_bank_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let source = source(tmp.path()).await;
        let bank = Bank {
            id: "nope".into(),
            key: String::new(),
            name: "Nope".into(),
            count: 0,
            order: 0,
        };
        assert!(matches!(
            source.list_categories(&bank).await,
            Err(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_login_requires_password() {
        let tmp = tempfile::tempdir().unwrap();
        let source = source(tmp.path()).await;
        assert!(matches!(source.login("me", "").await, Err(SourceError::Auth(_))));
        let session = source.login("me", "secret").await.unwrap();
        assert_eq!(session["username"], "me");
    }
}

//! Source ports: where raw items and catalog listings come from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SourceError;
use crate::domain::{Bank, Category, FetchedItem, Sheet, SheetCoordinate};

/// A batch of item ids leased from the source for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBatch {
    pub batch_id: String,
    pub item_ids: Vec<String>,
}

/// Batch-oriented item source driven by the fetch engine.
///
/// Batches are leases: every item of a leased batch is acknowledged once it
/// is durably cached, then the batch is closed. Batch ids must not start with
/// `_`, which marks synthetic replay batches.
#[async_trait]
pub trait SourcePort: Send + Sync {
    /// Lease the next batch of items for `sheet`. An empty batch means the
    /// source has nothing more to hand out right now.
    async fn list_batch(&self, sheet: &SheetCoordinate) -> Result<SourceBatch, SourceError>;

    /// Fetch item details for `ids`. Items the source no longer knows are
    /// simply absent from the result.
    async fn fetch_items(
        &self,
        sheet: &SheetCoordinate,
        ids: &[String],
    ) -> Result<Vec<FetchedItem>, SourceError>;

    /// Record that `item_id` (at `index` within the batch) was processed.
    async fn acknowledge(
        &self,
        batch_id: &str,
        item_id: &str,
        index: usize,
    ) -> Result<(), SourceError>;

    async fn close_batch(&self, batch_id: &str) -> Result<(), SourceError>;
}

/// Catalog side of a source: login and hierarchical listings.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Authenticate and return opaque session material.
    async fn login(&self, username: &str, password: &str) -> Result<Value, SourceError>;

    async fn list_banks(&self) -> Result<Vec<Bank>, SourceError>;

    async fn list_categories(&self, bank: &Bank) -> Result<Vec<Category>, SourceError>;

    async fn list_sheets(
        &self,
        bank: &Bank,
        category: &Category,
    ) -> Result<Vec<Sheet>, SourceError>;
}

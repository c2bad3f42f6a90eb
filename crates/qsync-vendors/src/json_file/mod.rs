//! A local vendor backed by a JSON document.

mod config;
mod document;
mod error;
mod ledger;
mod port;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use qsync_core::{FetchedItem, SheetCoordinate, SourceBatch};
use tokio::sync::Mutex;

pub use config::{DEFAULT_BATCH_SIZE, JsonFileConfig};
pub use error::{JsonFileError, JsonFileResult};

use document::Document;
use ledger::Ledger;

#[derive(Debug, Default)]
struct HandOut {
    ledger: Ledger,
    /// Ids leased by this process, acknowledged or not.
    served: HashSet<String>,
}

/// Serves the items of one JSON document in leased batches.
#[derive(Debug)]
pub struct JsonFileSource {
    config: JsonFileConfig,
    document: Document,
    state: Mutex<HandOut>,
    session: i64,
    next_batch: AtomicU64,
}

impl JsonFileSource {
    /// Read and index the document, and load its sidecar ledger.
    pub async fn open(config: JsonFileConfig) -> JsonFileResult<Self> {
        let json = tokio::fs::read_to_string(&config.path)
            .await
            .map_err(|e| JsonFileError::io(&config.path, &e))?;
        let document = Document::parse(&json)?;
        let ledger = Ledger::load(&config.sidecar_path()).await?;

        tracing::debug!(
            target: "qsync.vendor",
            path = %config.path.display(),
            acknowledged = ledger.acknowledged_count(),
            "Opened JSON document"
        );

        Ok(Self {
            config,
            document,
            state: Mutex::new(HandOut {
                ledger,
                served: HashSet::new(),
            }),
            session: chrono::Utc::now().timestamp_millis(),
            next_batch: AtomicU64::new(1),
        })
    }

    pub const fn config(&self) -> &JsonFileConfig {
        &self.config
    }

    /// Items under the sheet's category that were neither acknowledged nor
    /// handed out by this process, up to the batch size.
    async fn lease(&self, sheet: &SheetCoordinate) -> JsonFileResult<SourceBatch> {
        let candidates = self.document.items_under(&sheet.bank, &sheet.category)?;

        let mut state = self.state.lock().await;
        let item_ids: Vec<String> = candidates
            .iter()
            .filter(|item| !state.ledger.is_acknowledged(&item.id) && !state.served.contains(&item.id))
            .take(self.config.batch_size)
            .map(|item| item.id.clone())
            .collect();
        state.served.extend(item_ids.iter().cloned());

        let seq = self.next_batch.fetch_add(1, Ordering::SeqCst);
        Ok(SourceBatch {
            batch_id: format!("{}-{seq}", self.session),
            item_ids,
        })
    }

    fn details(&self, ids: &[String]) -> Vec<FetchedItem> {
        ids.iter()
            .filter_map(|id| self.document.item(id))
            .map(|stored| {
                let mut fetched = FetchedItem::new(stored.raw.clone());
                if let Some(answer) = self.document.answer(&stored.id) {
                    fetched = fetched.with_auxiliary("answer", answer.clone());
                }
                if let Some(explain) = self.document.explain(&stored.id) {
                    fetched = fetched.with_auxiliary("explain", explain.clone());
                }
                fetched
            })
            .collect()
    }

    async fn record_ack(&self, batch_id: &str, item_id: &str, index: usize) -> JsonFileResult<()> {
        let mut state = self.state.lock().await;
        if state.ledger.acknowledge(item_id) {
            state.ledger.persist(&self.config.sidecar_path()).await?;
        } else {
            tracing::warn!(
                target: "qsync.vendor",
                batch_id,
                item_id,
                index,
                "Item acknowledged twice"
            );
        }
        Ok(())
    }

    async fn record_close(&self, batch_id: &str) -> JsonFileResult<()> {
        let mut state = self.state.lock().await;
        state.ledger.close(batch_id);
        state.ledger.persist(&self.config.sidecar_path()).await
    }
}

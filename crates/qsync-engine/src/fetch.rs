//! Resumable fetch stage.
//!
//! Pulls raw items for one sheet from a [`SourcePort`] into the cache store.
//! The store holds two disjoint sets per sheet: finalized raw items (`D`)
//! and in-flight checkpoints (`B`). A checkpoint is written before any item
//! of its batch is processed and deleted only after the batch is closed, so
//! an interrupted run is resumed from the checkpoint by the next one.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use qsync_core::keys;
use qsync_core::ports::cache_store::{load, save};
use qsync_core::{
    CacheStorePort, CheckpointBatch, ProgressSender, SheetCoordinate, SourcePort, SyncError,
    compare_item_ids, sort_item_ids,
};
use tokio_util::sync::CancellationToken;

use crate::config::FetchConfig;
use crate::pacing::{ensure_running, pause};

/// Dependencies of the fetch stage.
#[derive(Clone)]
pub struct FetchDeps {
    pub source: Arc<dyn SourcePort>,
    pub store: Arc<dyn CacheStorePort>,
    pub config: FetchConfig,
}

/// One fetch run for one sheet.
pub struct FetchJob {
    pub sheet: SheetCoordinate,
    /// Number of items the sheet is expected to hold.
    pub target: u64,
    /// Re-fetch every already cached item.
    pub refetch: bool,
    pub cancel: CancellationToken,
    pub progress: ProgressSender,
}

/// Outcome of a fetch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Finalized items at the end of the run.
    pub finalized: u64,
    /// Items persisted by this run.
    pub fetched: u64,
    /// Acknowledgements sent to the source by this run.
    pub acknowledged: u64,
    /// Batches (leased or replayed) processed by this run.
    pub batches: u64,
    /// Whether the run stopped because no batch made progress.
    pub stalled: bool,
}

impl FetchSummary {
    pub const fn is_complete(&self, target: u64) -> bool {
        self.finalized >= target
    }
}

struct FetchRun<'a> {
    deps: &'a FetchDeps,
    sheet: &'a SheetCoordinate,
    cancel: &'a CancellationToken,
    finalized: HashSet<String>,
    pending: VecDeque<String>,
    summary: FetchSummary,
}

/// Run a fetch job to completion.
///
/// Returns once the sheet holds `target` items with no checkpoint left, or
/// once `no_progress_limit` consecutive batches added nothing. Any source or
/// store error aborts the run with checkpoints intact.
pub async fn run_fetch(job: FetchJob, deps: &FetchDeps) -> Result<FetchSummary, SyncError> {
    let FetchJob {
        sheet,
        target,
        refetch,
        cancel,
        mut progress,
    } = job;

    if sheet.is_aggregate() {
        return Err(SyncError::AggregateSheet);
    }

    let mut run = FetchRun::load(deps, &sheet, &cancel).await?;
    if refetch {
        run.replay_finalized().await?;
    }

    tracing::info!(
        target: "qsync.fetch",
        sheet = %sheet,
        target,
        finalized = run.finalized.len(),
        pending_batches = run.pending.len(),
        refetch,
        "Fetch started"
    );

    progress.emit(run.done());
    let mut no_progress = 0u32;

    while (run.done() < target || !run.pending.is_empty())
        && no_progress < deps.config.no_progress_limit
    {
        ensure_running(&cancel)?;
        progress.emit(run.done());

        let before = run.done();
        run.next_batch(&mut progress).await?;

        if run.done() > before {
            no_progress = 0;
        } else {
            no_progress += 1;
            tracing::debug!(
                target: "qsync.fetch",
                sheet = %sheet,
                no_progress,
                limit = deps.config.no_progress_limit,
                "Batch added no items"
            );
        }
    }

    run.summary.finalized = run.done();
    run.summary.stalled = no_progress >= deps.config.no_progress_limit;
    progress.emit(run.done());
    pause(deps.config.finish_delay, &cancel).await?;
    progress.close();

    if run.summary.stalled && run.done() < target {
        tracing::warn!(
            target: "qsync.fetch",
            sheet = %sheet,
            finalized = run.summary.finalized,
            target,
            "Fetch stopped without reaching target"
        );
    } else {
        tracing::info!(
            target: "qsync.fetch",
            sheet = %sheet,
            finalized = run.summary.finalized,
            fetched = run.summary.fetched,
            acknowledged = run.summary.acknowledged,
            "Fetch finished"
        );
    }
    Ok(run.summary)
}

impl<'a> FetchRun<'a> {
    async fn load(
        deps: &'a FetchDeps,
        sheet: &'a SheetCoordinate,
        cancel: &'a CancellationToken,
    ) -> Result<Self, SyncError> {
        let store = deps.store.as_ref();
        let finalized: HashSet<String> = keys::scan_ids(store, &keys::origin_items_pattern(sheet))
            .await?
            .into_iter()
            .collect();

        let mut pending =
            keys::scan_ids(store, &keys::checkpoints_pattern(sheet, &deps.config.batch_scope))
                .await?;
        pending.sort_by(|a, b| compare_batch_ids(a, b));

        Ok(Self {
            deps,
            sheet,
            cancel,
            finalized,
            pending: pending.into(),
            summary: FetchSummary::default(),
        })
    }

    fn done(&self) -> u64 {
        self.finalized.len() as u64
    }

    fn checkpoint_key(&self, batch_id: &str) -> String {
        keys::checkpoint(self.sheet, &self.deps.config.batch_scope, batch_id)
    }

    /// Turn every finalized id into synthetic checkpoints and forget `D`.
    async fn replay_finalized(&mut self) -> Result<(), SyncError> {
        let mut ids: Vec<String> = self.finalized.drain().collect();
        sort_item_ids(&mut ids);

        for (index, chunk) in ids.chunks(self.deps.config.batch_size.get()).enumerate() {
            let batch = CheckpointBatch::synthetic(index, chunk.to_vec());
            save(
                self.deps.store.as_ref(),
                &self.checkpoint_key(&batch.batch_id),
                &batch,
                None,
            )
            .await?;
            if !self.pending.contains(&batch.batch_id) {
                self.pending.push_back(batch.batch_id);
            }
        }

        tracing::debug!(
            target: "qsync.fetch",
            sheet = %self.sheet,
            items = ids.len(),
            batches = self.pending.len(),
            "Replaying cached items"
        );
        Ok(())
    }

    /// Take a checkpoint from `B` or lease a new batch, and process it.
    async fn next_batch(&mut self, progress: &mut ProgressSender) -> Result<(), SyncError> {
        let batch = match self.pending.pop_front() {
            Some(batch_id) => {
                let key = self.checkpoint_key(&batch_id);
                match load::<CheckpointBatch>(self.deps.store.as_ref(), &key).await? {
                    Some(batch) => batch,
                    None => {
                        tracing::warn!(
                            target: "qsync.fetch",
                            sheet = %self.sheet,
                            batch_id = %batch_id,
                            "Checkpoint disappeared before it was processed"
                        );
                        return Ok(());
                    }
                }
            }
            None => {
                let leased = self.deps.source.list_batch(self.sheet).await?;
                let batch = CheckpointBatch::leased(leased.batch_id, leased.item_ids);
                save(
                    self.deps.store.as_ref(),
                    &self.checkpoint_key(&batch.batch_id),
                    &batch,
                    None,
                )
                .await?;
                tracing::debug!(
                    target: "qsync.fetch",
                    sheet = %self.sheet,
                    batch_id = %batch.batch_id,
                    items = batch.item_ids.len(),
                    "Leased batch"
                );
                batch
            }
        };

        self.process(&batch, progress).await?;

        if !batch.synthetic {
            self.deps.source.close_batch(&batch.batch_id).await?;
        }
        self.deps
            .store
            .delete(&self.checkpoint_key(&batch.batch_id))
            .await?;
        self.summary.batches += 1;
        Ok(())
    }

    async fn process(
        &mut self,
        batch: &CheckpointBatch,
        progress: &mut ProgressSender,
    ) -> Result<(), SyncError> {
        let todo: Vec<(usize, &String)> = batch
            .item_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| !self.finalized.contains(*id))
            .collect();
        if todo.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = todo.iter().map(|(_, id)| (*id).clone()).collect();
        let mut fetched: HashMap<String, _> = self
            .deps
            .source
            .fetch_items(self.sheet, &ids)
            .await?
            .into_iter()
            .map(|item| (item.item.id.clone(), item))
            .collect();

        for (index, id) in todo {
            ensure_running(self.cancel)?;

            let Some(item) = fetched.remove(id) else {
                tracing::warn!(
                    target: "qsync.fetch",
                    sheet = %self.sheet,
                    item_id = %id,
                    "Source returned no detail for item"
                );
                continue;
            };
            let item = item.into_raw_item();

            save(
                self.deps.store.as_ref(),
                &keys::origin_item(self.sheet, &item.id),
                &item,
                None,
            )
            .await?;
            self.finalized.insert(item.id.clone());
            self.summary.fetched += 1;
            progress.emit(self.done());

            if !batch.synthetic {
                self.deps
                    .source
                    .acknowledge(&batch.batch_id, &item.id, index)
                    .await?;
                self.summary.acknowledged += 1;
            }

            pause(self.deps.config.item_delay, self.cancel).await?;
        }
        Ok(())
    }
}

/// Synthetic replay batches first (`_0`, `_1`, ...), then leased ones.
fn compare_batch_ids(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.strip_prefix('_'), b.strip_prefix('_')) {
        (Some(x), Some(y)) => compare_item_ids(x, y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => compare_item_ids(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_order() {
        let mut ids: Vec<String> = ["7", "_10", "_2", "3"].iter().map(ToString::to_string).collect();
        ids.sort_by(|a, b| compare_batch_ids(a, b));
        assert_eq!(ids, vec!["_2", "_10", "3", "7"]);
    }
}

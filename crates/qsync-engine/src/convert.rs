//! Convert stage: render cached raw items into cached artifacts.

use std::collections::HashSet;
use std::sync::Arc;

use qsync_core::keys::{self, CacheScope};
use qsync_core::ports::cache_store::{load, save};
use qsync_core::{
    ArtifactCoordinate, CacheStorePort, ItemKind, ProgressSender, RawItem, SinkPort, StoreError,
    SyncError, sort_item_ids,
};
use tokio_util::sync::CancellationToken;

use crate::config::ConvertConfig;
use crate::pacing::{ensure_running, pause};

/// Dependencies of the convert stage.
#[derive(Clone)]
pub struct ConvertDeps {
    /// Provides the render strategy; delivery is not used here.
    pub sink: Arc<dyn SinkPort>,
    pub store: Arc<dyn CacheStorePort>,
    pub config: ConvertConfig,
}

/// One convert run for one sheet and output.
pub struct ConvertJob {
    pub coordinate: ArtifactCoordinate,
    /// Drop existing artifacts and render everything again.
    pub reconvert: bool,
    pub cancel: CancellationToken,
    pub progress: ProgressSender,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Artifacts present at the end of the run.
    pub converted: u64,
    /// Artifacts rendered by this run.
    pub rendered: u64,
    /// Artifacts removed up front by a reconvert.
    pub invalidated: u64,
}

/// Run a convert job to completion.
///
/// Items are rendered in ascending numeric id order. The first item with an
/// unknown type tag or a failed render aborts the run; artifacts already
/// written stay, so a re-run continues after them.
pub async fn run_convert(
    job: ConvertJob,
    deps: &ConvertDeps,
) -> Result<ConvertSummary, SyncError> {
    let ConvertJob {
        coordinate,
        reconvert,
        cancel,
        mut progress,
    } = job;

    if coordinate.sheet.is_aggregate() {
        return Err(SyncError::AggregateSheet);
    }

    let store = deps.store.as_ref();
    let mut summary = ConvertSummary::default();

    if reconvert {
        summary.invalidated = keys::invalidate(store, &CacheScope::Items(&coordinate)).await?;
    }

    let finalized = keys::scan_ids(store, &keys::origin_items_pattern(&coordinate.sheet)).await?;
    let existing: HashSet<String> = keys::scan_ids(store, &keys::artifacts_pattern(&coordinate))
        .await?
        .into_iter()
        .collect();

    let mut pending: Vec<String> = finalized
        .into_iter()
        .filter(|id| !existing.contains(id))
        .collect();
    sort_item_ids(&mut pending);

    tracing::info!(
        target: "qsync.convert",
        coordinate = %coordinate,
        existing = existing.len(),
        pending = pending.len(),
        reconvert,
        "Convert started"
    );

    let mut done = existing.len() as u64;
    progress.emit(done);

    for id in pending {
        ensure_running(&cancel)?;

        let item: RawItem = load(store, &keys::origin_item(&coordinate.sheet, &id))
            .await?
            .ok_or_else(|| StoreError::NotFound(keys::origin_item(&coordinate.sheet, &id)))?;

        let Some(kind) = ItemKind::from_tag(item.type_tag) else {
            tracing::error!(
                target: "qsync.convert",
                coordinate = %coordinate,
                item_id = %item.id,
                tag = item.type_tag,
                "Unsupported item type"
            );
            let tag = item.type_tag;
            let raw = serde_json::to_value(&item).unwrap_or_default();
            return Err(SyncError::UnsupportedType { tag, item: raw });
        };

        let artifact = deps
            .sink
            .render(kind, &item)
            .map_err(|e| SyncError::validation(&item.id, &e))?;

        save(store, &keys::artifact(&coordinate, &item.id), &artifact, None).await?;
        summary.rendered += 1;
        done += 1;
        progress.emit(done);

        pause(deps.config.item_delay, &cancel).await?;
    }

    summary.converted = done;
    progress.emit(done);
    pause(deps.config.finish_delay, &cancel).await?;
    progress.close();

    tracing::info!(
        target: "qsync.convert",
        coordinate = %coordinate,
        converted = summary.converted,
        rendered = summary.rendered,
        "Convert finished"
    );
    Ok(summary)
}

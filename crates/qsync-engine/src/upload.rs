//! Upload stage: deliver cached artifacts to a sink, resuming from its cursor.

use std::sync::Arc;

use qsync_core::keys;
use qsync_core::ports::cache_store::load;
use qsync_core::{
    Artifact, ArtifactCoordinate, CacheStorePort, ProgressSender, SinkPort, StoreError, SyncError,
    sort_item_ids,
};
use tokio_util::sync::CancellationToken;

use crate::config::UploadConfig;
use crate::pacing::{ensure_running, pause};

/// Dependencies of the upload stage.
#[derive(Clone)]
pub struct UploadDeps {
    pub sink: Arc<dyn SinkPort>,
    pub store: Arc<dyn CacheStorePort>,
    pub config: UploadConfig,
}

/// One upload run for one concrete sheet and output.
pub struct UploadJob {
    pub coordinate: ArtifactCoordinate,
    /// Start from position zero instead of the sink's delivered count.
    pub reupload: bool,
    pub cancel: CancellationToken,
    pub progress: ProgressSender,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Position delivery resumed from.
    pub offset: u64,
    /// Artifacts delivered by this run.
    pub delivered: u64,
    /// Artifacts available for the sheet.
    pub total: u64,
}

/// Run an upload job to completion.
///
/// The cursor is never stored: it is the sink's delivered count, or zero on
/// a forced re-upload. A delivery failure aborts the run; the next run
/// re-derives the cursor from the sink.
pub async fn run_upload(job: UploadJob, deps: &UploadDeps) -> Result<UploadSummary, SyncError> {
    let UploadJob {
        coordinate,
        reupload,
        cancel,
        mut progress,
    } = job;

    if coordinate.sheet.is_aggregate() {
        return Err(SyncError::AggregateSheet);
    }

    let store = deps.store.as_ref();
    let mut ids = keys::scan_ids(store, &keys::artifacts_pattern(&coordinate)).await?;
    sort_item_ids(&mut ids);

    let offset = if reupload {
        0
    } else {
        deps.sink.delivered_count().await?
    };
    let total = ids.len() as u64;

    tracing::info!(
        target: "qsync.upload",
        coordinate = %coordinate,
        offset,
        total,
        reupload,
        "Upload started"
    );

    let mut summary = UploadSummary {
        offset,
        delivered: 0,
        total,
    };
    progress.emit(offset);

    let start = usize::try_from(offset).unwrap_or(usize::MAX);
    for (position, id) in ids.iter().enumerate().skip(start) {
        ensure_running(&cancel)?;

        let key = keys::artifact(&coordinate, id);
        let artifact: Artifact = load(store, &key)
            .await?
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;

        let position = position as u64;
        deps.sink.deliver(position, &artifact).await?;
        summary.delivered += 1;
        progress.emit(position + 1);

        tracing::debug!(
            target: "qsync.upload",
            coordinate = %coordinate,
            item_id = %id,
            position,
            "Delivered artifact"
        );

        pause(deps.config.item_delay, &cancel).await?;
    }

    progress.emit(total.max(offset));
    pause(deps.config.finish_delay, &cancel).await?;
    progress.close();

    tracing::info!(
        target: "qsync.upload",
        coordinate = %coordinate,
        delivered = summary.delivered,
        total,
        "Upload finished"
    );
    Ok(summary)
}

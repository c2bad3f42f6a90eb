//! Fetch, convert, upload and sync handlers.
//!
//! Each stage runs once per concrete sheet: a named sheet is one run, the
//! ALL sheet fans out to every real sheet of the category.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use qsync_core::paths::output_root;
use qsync_core::{
    ArtifactCoordinate, Bank, Category, ResourceNode, Settings, Sheet, SheetCoordinate, SinkPort,
    keys, progress_channel,
};
use qsync_engine::{
    ConvertConfig, ConvertDeps, ConvertJob, FetchConfig, FetchDeps, FetchJob, UploadConfig,
    UploadDeps, UploadJob, run_convert, run_fetch, run_upload,
};
use qsync_render::{DirectorySink, MarkdownSink, SkipSink};
use qsync_vendors::OutputKind;

use crate::bootstrap::{CliContext, VendorSession};
use crate::commands::{OutputArgs, StageArgs};
use crate::error::CliError;
use crate::handlers::catalog::{bank_named, category_named};
use crate::handlers::select::{concrete, find};
use crate::presentation::StageBar;

const DEFAULT_OUTPUT: &str = "markdown";

/// Re-run switches for `sync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncFlags {
    pub refetch: bool,
    pub reconvert: bool,
    pub reupload: bool,
}

/// The sheets a stage command resolved to.
struct Selection {
    bank: Bank,
    category: Category,
    sheets: Vec<Sheet>,
}

impl Selection {
    fn coordinate(&self, vendor: &str, sheet: &Sheet) -> SheetCoordinate {
        SheetCoordinate::new(vendor, &self.bank.id, &self.category.id, &sheet.id)
    }
}

pub async fn fetch(ctx: &CliContext, target: &StageArgs, refetch: bool) -> Result<(), CliError> {
    let session = ctx.session().await?;
    require_login(ctx, session).await?;
    let settings = ctx.current_settings().await?;
    let selection = select(session, target).await?;

    for sheet in &selection.sheets {
        let coordinate = selection.coordinate(session.vendor.kind.key(), sheet);
        fetch_sheet(ctx, session, &settings, &coordinate, sheet.count, refetch).await?;
    }
    Ok(())
}

pub async fn convert(
    ctx: &CliContext,
    target: &StageArgs,
    output: &OutputArgs,
    reconvert: bool,
) -> Result<(), CliError> {
    let session = ctx.session().await?;
    let settings = ctx.current_settings().await?;
    let kind = output_kind(session, &settings, output)?;
    let selection = select(session, target).await?;

    for sheet in &selection.sheets {
        let coordinate = selection
            .coordinate(session.vendor.kind.key(), sheet)
            .with_output(kind.key());
        let sink = sink_for(ctx, kind, &coordinate, output.out_dir.as_deref());
        convert_sheet(ctx, &settings, sink, &coordinate, reconvert).await?;
    }
    Ok(())
}

pub async fn upload(
    ctx: &CliContext,
    target: &StageArgs,
    output: &OutputArgs,
    reupload: bool,
) -> Result<(), CliError> {
    let session = ctx.session().await?;
    let settings = ctx.current_settings().await?;
    let kind = output_kind(session, &settings, output)?;
    let selection = select(session, target).await?;

    for sheet in &selection.sheets {
        let coordinate = selection
            .coordinate(session.vendor.kind.key(), sheet)
            .with_output(kind.key());
        let sink = sink_for(ctx, kind, &coordinate, output.out_dir.as_deref());
        upload_sheet(ctx, &settings, sink, &coordinate, reupload).await?;
    }
    Ok(())
}

/// Fetch, convert and upload each sheet before moving to the next.
pub async fn sync(
    ctx: &CliContext,
    target: &StageArgs,
    output: &OutputArgs,
    flags: SyncFlags,
) -> Result<(), CliError> {
    let session = ctx.session().await?;
    require_login(ctx, session).await?;
    let settings = ctx.current_settings().await?;
    let kind = output_kind(session, &settings, output)?;
    let selection = select(session, target).await?;

    for sheet in &selection.sheets {
        let origin = selection.coordinate(session.vendor.kind.key(), sheet);
        fetch_sheet(ctx, session, &settings, &origin, sheet.count, flags.refetch).await?;

        let coordinate = origin.with_output(kind.key());
        let sink = sink_for(ctx, kind, &coordinate, output.out_dir.as_deref());
        convert_sheet(ctx, &settings, Arc::clone(&sink), &coordinate, flags.reconvert).await?;
        upload_sheet(ctx, &settings, sink, &coordinate, flags.reupload).await?;
    }
    Ok(())
}

async fn require_login(ctx: &CliContext, session: &VendorSession) -> Result<(), CliError> {
    session.catalog.login(&ctx.config.username, None).await?;
    Ok(())
}

async fn select(session: &VendorSession, target: &StageArgs) -> Result<Selection, CliError> {
    let bank = bank_named(session, &target.bank).await?;
    let category = category_named(session, &bank, &target.category).await?;
    let listed = session.catalog.sheets(&bank, &category, false).await?;
    let chosen = find("sheet", &listed, &target.sheet)?;

    let sheets: Vec<Sheet> = if chosen.is_aggregate() {
        concrete(&listed).into_iter().cloned().collect()
    } else {
        vec![chosen.clone()]
    };
    if sheets.is_empty() {
        return Err(CliError::Arguments(format!(
            "Category '{}' has no sheets",
            category.name
        )));
    }
    Ok(Selection {
        bank,
        category,
        sheets,
    })
}

fn output_kind(
    session: &VendorSession,
    settings: &Settings,
    output: &OutputArgs,
) -> Result<OutputKind, CliError> {
    let key = output
        .output
        .as_deref()
        .or(settings.default_output.as_deref())
        .unwrap_or(DEFAULT_OUTPUT);
    Ok(session.vendor.kind.output(key)?)
}

/// Where a sheet's files land: `<root>/<vendor>/<bank>/<category>/<sheet>`.
pub fn delivery_dir(root: &Path, coordinate: &ArtifactCoordinate) -> PathBuf {
    let sheet = &coordinate.sheet;
    [&sheet.vendor, &sheet.bank, &sheet.category, &sheet.sheet]
        .into_iter()
        .fold(root.to_path_buf(), |dir, segment| {
            dir.join(path_segment(segment))
        })
}

fn path_segment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => format!("_{cleaned}"),
        _ => cleaned,
    }
}

fn sink_for(
    ctx: &CliContext,
    kind: OutputKind,
    coordinate: &ArtifactCoordinate,
    out_dir: Option<&Path>,
) -> Arc<dyn SinkPort> {
    match kind {
        OutputKind::Markdown => {
            let root = out_dir.map_or_else(|| output_root(&ctx.data_root), Path::to_path_buf);
            Arc::new(MarkdownSink::new(DirectorySink::new(delivery_dir(
                &root, coordinate,
            ))))
        }
        OutputKind::Skip => Arc::new(SkipSink::new()),
    }
}

async fn fetch_sheet(
    ctx: &CliContext,
    session: &VendorSession,
    settings: &Settings,
    coordinate: &SheetCoordinate,
    target: u64,
    refetch: bool,
) -> Result<(), CliError> {
    let deps = FetchDeps {
        source: Arc::clone(&session.vendor.source),
        store: Arc::clone(&ctx.stores.cache),
        config: FetchConfig::from_settings(settings),
    };
    let (progress, receiver) = progress_channel();
    let job = FetchJob {
        sheet: coordinate.clone(),
        target,
        refetch,
        cancel: ctx.cancel.clone(),
        progress,
    };

    let bar = StageBar::new("fetch", &coordinate.to_string(), target);
    let (result, ()) = tokio::join!(run_fetch(job, &deps), bar.follow(receiver));
    let summary = result?;

    if summary.is_complete(target) {
        println!(
            "✓ Fetched {coordinate}: {} items ({} new)",
            summary.finalized, summary.fetched
        );
    } else {
        println!(
            "! Fetched {coordinate}: {} of {target} items; the vendor stopped handing out new ones",
            summary.finalized
        );
    }
    Ok(())
}

async fn convert_sheet(
    ctx: &CliContext,
    settings: &Settings,
    sink: Arc<dyn SinkPort>,
    coordinate: &ArtifactCoordinate,
    reconvert: bool,
) -> Result<(), CliError> {
    let total = keys::scan_ids(
        ctx.stores.cache.as_ref(),
        &keys::origin_items_pattern(&coordinate.sheet),
    )
    .await?
    .len() as u64;

    let deps = ConvertDeps {
        sink,
        store: Arc::clone(&ctx.stores.cache),
        config: ConvertConfig::from_settings(settings),
    };
    let (progress, receiver) = progress_channel();
    let job = ConvertJob {
        coordinate: coordinate.clone(),
        reconvert,
        cancel: ctx.cancel.clone(),
        progress,
    };

    let bar = StageBar::new("convert", &coordinate.to_string(), total);
    let (result, ()) = tokio::join!(run_convert(job, &deps), bar.follow(receiver));
    let summary = result?;

    println!(
        "✓ Converted {coordinate}: {} rendered, {} already up to date",
        summary.rendered,
        summary.converted.saturating_sub(summary.rendered)
    );
    Ok(())
}

async fn upload_sheet(
    ctx: &CliContext,
    settings: &Settings,
    sink: Arc<dyn SinkPort>,
    coordinate: &ArtifactCoordinate,
    reupload: bool,
) -> Result<(), CliError> {
    let total = keys::scan_ids(
        ctx.stores.cache.as_ref(),
        &keys::artifacts_pattern(coordinate),
    )
    .await?
    .len() as u64;

    let deps = UploadDeps {
        sink,
        store: Arc::clone(&ctx.stores.cache),
        config: UploadConfig::from_settings(settings),
    };
    let (progress, receiver) = progress_channel();
    let job = UploadJob {
        coordinate: coordinate.clone(),
        reupload,
        cancel: ctx.cancel.clone(),
        progress,
    };

    let bar = StageBar::new("upload", &coordinate.to_string(), total);
    let (result, ()) = tokio::join!(run_upload(job, &deps), bar.follow(receiver));
    let summary = result?;

    println!(
        "✓ Uploaded {coordinate}: {} delivered, resumed at {} of {}",
        summary.delivered, summary.offset, summary.total
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_dir_nests_coordinate() {
        let coordinate =
            SheetCoordinate::new("json-file", "law", "torts", "0").with_output("markdown");
        assert_eq!(
            delivery_dir(Path::new("/out"), &coordinate),
            PathBuf::from("/out/json-file/law/torts/0")
        );
    }

    #[test]
    fn test_path_segments_cannot_escape() {
        assert_eq!(path_segment("a/b"), "a_b");
        assert_eq!(path_segment(".."), "_..");
        assert_eq!(path_segment(""), "_");
        assert_eq!(path_segment("第一章"), "第一章");
    }
}

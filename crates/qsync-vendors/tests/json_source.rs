//! Fetching from a JSON document through the engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use qsync_core::{MemoryCacheStore, Settings, SheetCoordinate, keys, progress::detached};
use qsync_engine::{CancellationToken, FetchConfig, FetchDeps, FetchJob, run_fetch};
use qsync_vendors::{JsonFileConfig, JsonFileSource, VendorKind, VendorOptions, open_vendor};
use serde_json::json;

fn write_document(dir: &Path) -> PathBuf {
    let path = dir.join("bank.json");
    let document = json!({
        "banks": [{
            "id": "law",
            "name": "Law",
            "categories": [{"id": "torts", "name": "Torts"}]
        }],
        "items": [
            {"id": 3, "category": "torts", "type": 1, "content": "Q3", "options": ["a", "b"]},
            {"id": 1, "category": "torts", "type": 101, "content": "Q1"},
            {"id": 2, "category": "torts", "type": 61, "content": "Q2 ___"}
        ],
        "answers": [{"id": 3, "content": "A"}]
    });
    std::fs::write(&path, document.to_string()).unwrap();
    path
}

fn sheet() -> SheetCoordinate {
    SheetCoordinate::new("json-file", "law", "torts", "0")
}

fn job(target: u64) -> FetchJob {
    FetchJob {
        sheet: sheet(),
        target,
        refetch: false,
        cancel: CancellationToken::new(),
        progress: detached(),
    }
}

async fn deps(path: &Path, store: Arc<MemoryCacheStore>, batch_size: usize) -> FetchDeps {
    let config = JsonFileConfig::new(path).with_batch_size(batch_size);
    FetchDeps {
        source: Arc::new(JsonFileSource::open(config).await.unwrap()),
        store,
        config: FetchConfig::from_settings(&Settings::without_delays()),
    }
}

#[tokio::test]
async fn fetch_finalizes_every_item_and_records_acks() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_document(tmp.path());
    let store = Arc::new(MemoryCacheStore::new());

    let summary = run_fetch(job(3), &deps(&path, store.clone(), 2).await)
        .await
        .unwrap();

    assert_eq!(summary.finalized, 3);
    assert_eq!(summary.acknowledged, 3);
    assert!(!summary.stalled);

    let mut ids = keys::scan_ids(store.as_ref(), &keys::origin_items_pattern(&sheet()))
        .await
        .unwrap();
    ids.sort();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let ledger: serde_json::Value =
        serde_json::from_slice(&std::fs::read(tmp.path().join("bank.json.acks.json")).unwrap())
            .unwrap();
    assert_eq!(ledger["acknowledged"], json!(["1", "2", "3"]));
    assert_eq!(ledger["closed"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn reopened_source_serves_nothing_new() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_document(tmp.path());

    let first = Arc::new(MemoryCacheStore::new());
    run_fetch(job(3), &deps(&path, first, 10).await).await.unwrap();

    // A fresh cache cannot recover items the vendor already handed out.
    let second = Arc::new(MemoryCacheStore::new());
    let summary = run_fetch(job(3), &deps(&path, second, 10).await)
        .await
        .unwrap();
    assert_eq!(summary.finalized, 0);
    assert!(summary.stalled);
}

#[tokio::test]
async fn registry_opens_the_json_vendor() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_document(tmp.path());

    let vendor = open_vendor(
        VendorKind::JsonFile,
        &VendorOptions {
            document: Some(path),
            batch_size: Some(1),
        },
    )
    .await
    .unwrap();

    let banks = vendor.catalog.list_banks().await.unwrap();
    assert_eq!(banks[0].count, 3);

    let batch = vendor.source.list_batch(&sheet()).await.unwrap();
    assert_eq!(batch.item_ids, vec!["3"]);
}

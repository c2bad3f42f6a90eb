//! Cache entries and settings survive closing and reopening the database.

use qsync_core::keys::{self, CacheScope};
use qsync_core::{CacheStorePort, Settings, SettingsRepository, SheetCoordinate};
use qsync_db::{StoreFactory, setup_database};
use serde_json::json;

#[tokio::test]
async fn test_entries_survive_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("data").join("qsync.db");
    let sheet = SheetCoordinate::new("demo", "b", "c", "s");

    {
        let pool = setup_database(&path).await.unwrap();
        let stores = StoreFactory::build_stores(pool.clone());
        stores
            .cache
            .set(&keys::origin_item(&sheet, "1"), &json!({"id": "1", "type": 1}), None)
            .await
            .unwrap();
        stores
            .cache
            .set(&keys::checkpoint(&sheet, "batch", "7"), &json!({"batch_id": "7"}), None)
            .await
            .unwrap();
        tokio_test::assert_ok!(
            stores
                .settings
                .save(&Settings {
                    source_batch_size: Some(10),
                    ..Settings::with_defaults()
                })
                .await
        );
        pool.close().await;
    }

    let pool = setup_database(&path).await.unwrap();
    let store = StoreFactory::cache_store(pool.clone());

    let items = keys::scan_ids(store.as_ref(), &keys::origin_items_pattern(&sheet))
        .await
        .unwrap();
    assert_eq!(items, vec!["1"]);

    let checkpoints = keys::scan_ids(store.as_ref(), &keys::checkpoints_pattern(&sheet, "batch"))
        .await
        .unwrap();
    assert_eq!(checkpoints, vec!["7"]);

    let settings = StoreFactory::settings_repository(pool);
    assert_eq!(settings.load().await.unwrap().source_batch_size, Some(10));
}

#[tokio::test]
async fn test_scope_invalidation_against_sqlite() {
    let tmp = tempfile::tempdir().unwrap();
    let pool = setup_database(&tmp.path().join("qsync.db")).await.unwrap();
    let store = StoreFactory::cache_store(pool);

    let sheet = SheetCoordinate::new("demo", "b", "c", "s");
    let markdown = sheet.with_output("markdown");
    let skip = sheet.with_output("skip");
    for id in ["1", "2", "3"] {
        store
            .set(&keys::artifact(&markdown, id), &json!({"text": id}), None)
            .await
            .unwrap();
    }
    store
        .set(&keys::artifact(&skip, "1"), &json!({"text": ""}), None)
        .await
        .unwrap();

    let removed = keys::invalidate(store.as_ref(), &CacheScope::Items(&markdown))
        .await
        .unwrap();
    assert_eq!(removed, 3);
    assert_eq!(store.keys("*").await.unwrap(), vec![keys::artifact(&skip, "1")]);
}

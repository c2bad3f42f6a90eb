//! Shared fakes for the engine integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use qsync_core::{
    Artifact, CacheStorePort, FetchedItem, ItemKind, MemoryCacheStore, RawItem, RenderError,
    Settings, SheetCoordinate, SinkError, SinkPort, SourceBatch, SourceError, SourcePort,
    StoreError,
};
use qsync_engine::{ConvertConfig, ConvertDeps, FetchConfig, FetchDeps, UploadConfig, UploadDeps};
use serde_json::{Map, Value, json};

pub fn sheet() -> SheetCoordinate {
    SheetCoordinate::new("demo", "b1", "c1", "s1")
}

pub fn raw_item(id: &str, type_tag: i64) -> RawItem {
    let mut body = Map::new();
    body.insert("content".to_string(), json!(format!("Question {id}")));
    RawItem::new(id, type_tag, body)
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// A source handing out scripted batches, then empty ones.
#[derive(Default)]
pub struct FakeSource {
    items: HashMap<String, RawItem>,
    batches: Mutex<VecDeque<SourceBatch>>,
    fail_fetch_for: Mutex<Option<String>>,
    list_calls: AtomicUsize,
    empty_batches: AtomicUsize,
    pub acks: Mutex<Vec<(String, String, usize)>>,
    pub closed: Mutex<Vec<String>>,
    pub fetch_calls: Mutex<Vec<Vec<String>>>,
}

impl FakeSource {
    pub fn new(items: Vec<RawItem>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id.clone(), item)).collect(),
            ..Self::default()
        }
    }

    pub fn with_batch(self, batch_id: &str, item_ids: &[&str]) -> Self {
        self.batches.lock().unwrap().push_back(SourceBatch {
            batch_id: batch_id.to_string(),
            item_ids: ids(item_ids),
        });
        self
    }

    /// Fail the first `fetch_items` call whose ids include `id`.
    pub fn fail_once_fetching(&self, id: &str) {
        *self.fail_fetch_for.lock().unwrap() = Some(id.to_string());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn acked_ids(&self) -> Vec<String> {
        self.acks
            .lock()
            .unwrap()
            .iter()
            .map(|(_, id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl SourcePort for FakeSource {
    async fn list_batch(&self, _sheet: &SheetCoordinate) -> Result<SourceBatch, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(batch) = self.batches.lock().unwrap().pop_front() {
            return Ok(batch);
        }
        let n = self.empty_batches.fetch_add(1, Ordering::SeqCst);
        Ok(SourceBatch {
            batch_id: format!("empty-{n}"),
            item_ids: Vec::new(),
        })
    }

    async fn fetch_items(
        &self,
        _sheet: &SheetCoordinate,
        ids: &[String],
    ) -> Result<Vec<FetchedItem>, SourceError> {
        {
            let mut fail = self.fail_fetch_for.lock().unwrap();
            if fail.as_ref().is_some_and(|id| ids.contains(id)) {
                *fail = None;
                return Err(SourceError::Unavailable("connection reset".to_string()));
            }
        }
        self.fetch_calls.lock().unwrap().push(ids.to_vec());

        Ok(ids
            .iter()
            .filter_map(|id| self.items.get(id))
            .map(|item| {
                FetchedItem::new(item.clone())
                    .with_auxiliary("answer", json!(["A"]))
            })
            .collect())
    }

    async fn acknowledge(
        &self,
        batch_id: &str,
        item_id: &str,
        index: usize,
    ) -> Result<(), SourceError> {
        self.acks
            .lock()
            .unwrap()
            .push((batch_id.to_string(), item_id.to_string(), index));
        Ok(())
    }

    async fn close_batch(&self, batch_id: &str) -> Result<(), SourceError> {
        self.closed.lock().unwrap().push(batch_id.to_string());
        Ok(())
    }
}

/// A memory store whose writes start failing after a budget is spent.
pub struct FailingStore {
    inner: Arc<MemoryCacheStore>,
    writes_left: Mutex<Option<usize>>,
}

impl FailingStore {
    pub fn new(inner: Arc<MemoryCacheStore>, writes: usize) -> Self {
        Self {
            inner,
            writes_left: Mutex::new(Some(writes)),
        }
    }
}

#[async_trait]
impl CacheStorePort for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), StoreError> {
        {
            let mut left = self.writes_left.lock().unwrap();
            match left.as_mut() {
                Some(0) => return Err(StoreError::Storage("disk full".to_string())),
                Some(n) => *n -= 1,
                None => {}
            }
        }
        self.inner.set(key, value, ttl).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        self.inner.keys(pattern).await
    }

    async fn delete_by_prefix(&self, pattern: &str) -> Result<u64, StoreError> {
        self.inner.delete_by_prefix(pattern).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.delete(key).await
    }
}

/// A memory store counting every write it passes through.
pub struct CountingStore {
    inner: Arc<MemoryCacheStore>,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<MemoryCacheStore>) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.writes.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStorePort for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        self.inner.keys(pattern).await
    }

    async fn delete_by_prefix(&self, pattern: &str) -> Result<u64, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_by_prefix(pattern).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }
}

/// A sink rendering `content` verbatim and recording deliveries in memory.
#[derive(Default)]
pub struct RecordingSink {
    pub delivered: Mutex<Vec<(u64, String)>>,
    renders: AtomicUsize,
}

impl RecordingSink {
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn delivered_texts(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl SinkPort for RecordingSink {
    fn render(&self, kind: ItemKind, item: &RawItem) -> Result<Artifact, RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let content = item
            .field_str("content")
            .ok_or(RenderError::MissingField("content"))?;
        Ok(Artifact::new(format!("[{}] {content}", kind.label())))
    }

    async fn deliver(&self, position: u64, artifact: &Artifact) -> Result<(), SinkError> {
        let mut delivered = self.delivered.lock().unwrap();
        let position = usize::try_from(position).unwrap();
        delivered.truncate(position);
        delivered.push((position as u64, artifact.text.clone()));
        Ok(())
    }

    async fn delivered_count(&self) -> Result<u64, SinkError> {
        Ok(self.delivered.lock().unwrap().len() as u64)
    }
}

pub fn fetch_deps(source: Arc<dyn SourcePort>, store: Arc<dyn CacheStorePort>) -> FetchDeps {
    FetchDeps {
        source,
        store,
        config: FetchConfig::from_settings(&Settings::without_delays()),
    }
}

pub fn convert_deps(sink: Arc<dyn SinkPort>, store: Arc<dyn CacheStorePort>) -> ConvertDeps {
    ConvertDeps {
        sink,
        store,
        config: ConvertConfig::from_settings(&Settings::without_delays()),
    }
}

pub fn upload_deps(sink: Arc<dyn SinkPort>, store: Arc<dyn CacheStorePort>) -> UploadDeps {
    UploadDeps {
        sink,
        store,
        config: UploadConfig::from_settings(&Settings::without_delays()),
    }
}

//! A sink that discards everything.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use qsync_core::{Artifact, ItemKind, RawItem, RenderError, SinkError, SinkPort};

/// Renders an empty artifact for every item and accepts every delivery.
///
/// Useful to mark a sheet as handled without producing output. The delivered
/// count only covers the current process.
#[derive(Debug, Default)]
pub struct SkipSink {
    delivered: AtomicU64,
}

impl SkipSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SinkPort for SkipSink {
    fn render(&self, _kind: ItemKind, _item: &RawItem) -> Result<Artifact, RenderError> {
        Ok(Artifact::default())
    }

    async fn deliver(&self, position: u64, _artifact: &Artifact) -> Result<(), SinkError> {
        self.delivered.fetch_max(position + 1, Ordering::SeqCst);
        Ok(())
    }

    async fn delivered_count(&self) -> Result<u64, SinkError> {
        Ok(self.delivered.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[tokio::test]
    async fn test_accepts_anything() {
        let sink = SkipSink::new();
        let item = RawItem::new("1", 999, Map::new());

        assert_eq!(
            sink.render(ItemKind::Essay, &item).unwrap(),
            Artifact::default()
        );
        tokio_test::assert_ok!(sink.deliver(4, &Artifact::default()).await);
        tokio_test::assert_ok!(sink.deliver(2, &Artifact::default()).await);
        assert_eq!(sink.delivered_count().await.unwrap(), 5);
    }
}

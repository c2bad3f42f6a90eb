//! Markdown sink: the render registry delivering into a directory.

use async_trait::async_trait;
use qsync_core::{Artifact, ItemKind, RawItem, RenderError, SinkError, SinkPort};

use crate::directory::DirectorySink;
use crate::strategies;

/// Renders items to markdown and writes them as numbered files.
#[derive(Debug, Clone)]
pub struct MarkdownSink {
    target: DirectorySink,
}

impl MarkdownSink {
    pub const fn new(target: DirectorySink) -> Self {
        Self { target }
    }

    pub const fn target(&self) -> &DirectorySink {
        &self.target
    }
}

#[async_trait]
impl SinkPort for MarkdownSink {
    fn render(&self, kind: ItemKind, item: &RawItem) -> Result<Artifact, RenderError> {
        strategies::render(kind, item)
    }

    async fn deliver(&self, position: u64, artifact: &Artifact) -> Result<(), SinkError> {
        self.target.deliver(position, artifact).await
    }

    async fn delivered_count(&self) -> Result<u64, SinkError> {
        self.target.delivered_count().await
    }
}

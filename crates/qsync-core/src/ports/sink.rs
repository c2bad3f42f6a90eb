//! Sink port: render strategy plus delivery target.

use async_trait::async_trait;

use super::{RenderError, SinkError};
use crate::domain::{Artifact, ItemKind, RawItem};

/// Destination of rendered artifacts for one sheet.
///
/// `render` is pure and must handle every [`ItemKind`]. Delivery is
/// positional: the artifact at `position` replaces whatever was delivered
/// there before, and `delivered_count` reports how many leading positions
/// the destination already holds.
#[async_trait]
pub trait SinkPort: Send + Sync {
    fn render(&self, kind: ItemKind, item: &RawItem) -> Result<Artifact, RenderError>;

    async fn deliver(&self, position: u64, artifact: &Artifact) -> Result<(), SinkError>;

    async fn delivered_count(&self) -> Result<u64, SinkError>;
}

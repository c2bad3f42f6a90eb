//! Domain types for the sync pipeline.
//!
//! These are pure data types with no storage or transport concerns.

mod coordinate;
mod item;
mod resource;
mod session;

pub use coordinate::{ArtifactCoordinate, SheetCoordinate};
pub use item::{
    Artifact, CheckpointBatch, FetchedItem, ItemKind, RawItem, compare_item_ids, sort_item_ids,
};
pub use resource::{
    AGGREGATE_ID, AGGREGATE_NAME, AGGREGATE_ORDER, Bank, Category, PLACEHOLDER_ID,
    PLACEHOLDER_NAME, ResourceNode, Sheet,
};
pub use session::LoginSession;

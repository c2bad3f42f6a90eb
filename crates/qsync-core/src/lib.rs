#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]

pub mod domain;
pub mod error;
pub mod keys;
pub mod listing;
pub mod paths;
pub mod ports;
pub mod progress;
pub mod services;
pub mod settings;
pub mod store;

// Re-export commonly used types for convenience
pub use domain::{
    AGGREGATE_ID, AGGREGATE_NAME, AGGREGATE_ORDER, Artifact, ArtifactCoordinate, Bank, Category,
    CheckpointBatch, FetchedItem, ItemKind, LoginSession, PLACEHOLDER_ID, PLACEHOLDER_NAME,
    RawItem, ResourceNode, Sheet, SheetCoordinate, compare_item_ids, sort_item_ids,
};
pub use error::SyncError;
pub use keys::{CacheScope, KeyScope};
pub use listing::{ListOptions, normalize};
pub use ports::{
    CacheStorePort, CatalogPort, CoreError, RenderError, SettingsRepository, SinkError, SinkPort,
    SourceBatch, SourceError, SourcePort, StoreError, Stores,
};
pub use progress::{ProgressReceiver, ProgressSender, progress_channel};
pub use services::{CatalogError, CatalogService, SettingsService};
pub use settings::{Settings, SettingsError, SettingsUpdate, validate_settings};
pub use store::MemoryCacheStore;

// Re-export path utilities
pub use paths::{PathError, data_root, database_path, ensure_directory, env_file_path, output_root};

//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the pipeline expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` or HTTP types in any signature
//! - Store values are plain `serde_json::Value`; typed access goes through
//!   [`cache_store::load`] and [`cache_store::save`]
//! - Sources and sinks never see cache keys

pub mod cache_store;
pub mod settings_repository;
pub mod sink;
pub mod source;

use std::sync::Arc;
use thiserror::Error;

pub use cache_store::CacheStorePort;
pub use settings_repository::SettingsRepository;
pub use sink::SinkPort;
pub use source::{CatalogPort, SourceBatch, SourcePort};

/// Container for the persistence trait objects.
///
/// Lives in `qsync-core` so services can accept it without depending on
/// `qsync-db`.
#[derive(Clone)]
pub struct Stores {
    /// Key/value cache holding listings, raw items, checkpoints and artifacts.
    pub cache: Arc<dyn CacheStorePort>,
    /// Settings repository.
    pub settings: Arc<dyn SettingsRepository>,
}

impl Stores {
    pub fn new(cache: Arc<dyn CacheStorePort>, settings: Arc<dyn SettingsRepository>) -> Self {
        Self { cache, settings }
    }
}

/// Errors raised by the cache store and the settings repository.
///
/// Abstracts away storage implementation details (e.g., sqlx errors).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A key expected to be present was not.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors reported by a source. All of them are treated as transient:
/// the run aborts and persisted state is left for the next attempt.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not be reached or answered with a failure.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Credentials were rejected or the session expired.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The requested bank, category or sheet does not exist at the source.
    #[error("Not found at source: {0}")]
    NotFound(String),

    /// The source answered with something that could not be understood.
    #[error("Malformed source response: {0}")]
    Malformed(String),
}

/// Errors reported while delivering artifacts.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the destination failed.
    #[error("Delivery failed: {0}")]
    Io(String),

    /// The destination refused the artifact.
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

/// Errors raised by a render strategy for a well-typed but incomplete item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A sub-field the strategy needs is absent or empty.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A sub-field is present but unusable.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Errors surfaced by core services.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),
}

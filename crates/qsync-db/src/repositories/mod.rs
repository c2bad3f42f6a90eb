//! `SQLite` implementations of the core ports.

mod sqlite_cache_store;
mod sqlite_settings_repository;

pub use sqlite_cache_store::SqliteCacheStore;
pub use sqlite_settings_repository::SqliteSettingsRepository;

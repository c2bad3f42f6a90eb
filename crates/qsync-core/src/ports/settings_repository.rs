//! Settings repository trait definition.

use async_trait::async_trait;

use super::StoreError;
use crate::settings::Settings;

/// Repository for pipeline settings persistence.
///
/// Stores and retrieves the settings as a whole; the implementation handles
/// serialization.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load settings. Returns defaults if none are stored.
    async fn load(&self) -> Result<Settings, StoreError>;

    async fn save(&self, settings: &Settings) -> Result<(), StoreError>;
}

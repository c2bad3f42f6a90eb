//! Load, merge and persist pipeline settings.

use std::sync::Arc;

use crate::ports::{CoreError, SettingsRepository};
use crate::settings::{Settings, SettingsUpdate, validate_settings};

/// Reads and writes [`Settings`] through a [`SettingsRepository`].
///
/// Nothing that fails [`validate_settings`] ever reaches the repository.
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// The stored settings, or the defaults when none were saved.
    pub async fn current(&self) -> Result<Settings, CoreError> {
        Ok(self.repo.load().await?)
    }

    /// Apply `update` on top of the stored settings.
    pub async fn update(&self, update: SettingsUpdate) -> Result<Settings, CoreError> {
        let mut merged = self.current().await?;
        if update.is_empty() {
            return Ok(merged);
        }
        merged.merge(&update);
        self.persist(merged).await
    }

    /// Replace the stored settings as a whole.
    pub async fn replace(&self, settings: Settings) -> Result<Settings, CoreError> {
        self.persist(settings).await
    }

    /// Drop every override.
    pub async fn reset(&self) -> Result<Settings, CoreError> {
        self.persist(Settings::with_defaults()).await
    }

    async fn persist(&self, settings: Settings) -> Result<Settings, CoreError> {
        validate_settings(&settings)?;
        self.repo.save(&settings).await?;
        tracing::info!(
            target: "qsync.settings",
            batch_size = settings.effective_batch_size(),
            no_progress_limit = settings.effective_no_progress_limit(),
            listing_ttl_secs = ?settings.listing_ttl_secs,
            "Settings saved"
        );
        Ok(settings)
    }
}

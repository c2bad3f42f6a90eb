//! Per-stage configuration derived from [`Settings`].

use std::num::NonZeroUsize;
use std::time::Duration;

use qsync_core::Settings;

/// Checkpoint sub-namespace used for leased batches.
pub const DEFAULT_BATCH_SCOPE: &str = "batch";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Consecutive batches without new items before giving up.
    pub no_progress_limit: u32,
    /// Chunk size for synthetic re-fetch checkpoints.
    pub batch_size: NonZeroUsize,
    pub item_delay: Duration,
    pub finish_delay: Duration,
    pub batch_scope: String,
}

impl FetchConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            no_progress_limit: settings.effective_no_progress_limit(),
            batch_size: NonZeroUsize::new(settings.effective_batch_size())
                .unwrap_or(NonZeroUsize::MIN),
            item_delay: settings.fetch_item_delay(),
            finish_delay: settings.finish_delay(),
            batch_scope: DEFAULT_BATCH_SCOPE.to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::with_defaults())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub item_delay: Duration,
    pub finish_delay: Duration,
}

impl ConvertConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            item_delay: settings.convert_item_delay(),
            finish_delay: settings.finish_delay(),
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::with_defaults())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub item_delay: Duration,
    pub finish_delay: Duration,
}

impl UploadConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            item_delay: settings.upload_item_delay(),
            finish_delay: settings.finish_delay(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::with_defaults())
    }
}

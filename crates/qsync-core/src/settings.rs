//! Settings domain types and validation.
//!
//! Pure domain types with no infrastructure dependencies. Every field is
//! optional so stored settings survive new fields being added; the
//! `effective_*` accessors fall back to the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Consecutive batches without new items before a fetch gives up.
pub const DEFAULT_FETCH_NO_PROGRESS_LIMIT: u32 = 5;

/// Maximum item ids per synthetic re-fetch batch.
pub const DEFAULT_SOURCE_BATCH_SIZE: u32 = 100;

pub const DEFAULT_FETCH_ITEM_DELAY_MS: u64 = 100;
pub const DEFAULT_CONVERT_ITEM_DELAY_MS: u64 = 1000;
pub const DEFAULT_UPLOAD_ITEM_DELAY_MS: u64 = 1000;
pub const DEFAULT_FINISH_DELAY_MS: u64 = 0;

/// Longest lifetime accepted for cached listings: one week.
const MAX_LISTING_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Pipeline settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Consecutive no-progress fetch iterations tolerated (1-100).
    pub fetch_no_progress_limit: Option<u32>,

    /// Chunk size for synthetic re-fetch batches (1-1000).
    pub source_batch_size: Option<u32>,

    /// Pause after each fetched item, in milliseconds.
    pub fetch_item_delay_ms: Option<u64>,

    /// Pause after each converted item, in milliseconds.
    pub convert_item_delay_ms: Option<u64>,

    /// Pause after each delivered item, in milliseconds.
    pub upload_item_delay_ms: Option<u64>,

    /// Pause after a stage finishes, before its progress channel closes.
    pub finish_delay_ms: Option<u64>,

    /// Output used when a command does not name one.
    pub default_output: Option<String>,

    /// Lifetime of cached bank, category and sheet listings, in seconds.
    /// Unset keeps listings until they are refreshed.
    pub listing_ttl_secs: Option<u64>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            fetch_no_progress_limit: Some(DEFAULT_FETCH_NO_PROGRESS_LIMIT),
            source_batch_size: Some(DEFAULT_SOURCE_BATCH_SIZE),
            fetch_item_delay_ms: Some(DEFAULT_FETCH_ITEM_DELAY_MS),
            convert_item_delay_ms: Some(DEFAULT_CONVERT_ITEM_DELAY_MS),
            upload_item_delay_ms: Some(DEFAULT_UPLOAD_ITEM_DELAY_MS),
            finish_delay_ms: Some(DEFAULT_FINISH_DELAY_MS),
            default_output: None,
            listing_ttl_secs: None,
        }
    }

    /// Settings with every delay zeroed, for tests and dry runs.
    #[must_use]
    pub const fn without_delays() -> Self {
        let mut settings = Self::with_defaults();
        settings.fetch_item_delay_ms = Some(0);
        settings.convert_item_delay_ms = Some(0);
        settings.upload_item_delay_ms = Some(0);
        settings.finish_delay_ms = Some(0);
        settings
    }

    pub fn effective_no_progress_limit(&self) -> u32 {
        self.fetch_no_progress_limit
            .unwrap_or(DEFAULT_FETCH_NO_PROGRESS_LIMIT)
    }

    pub fn effective_batch_size(&self) -> usize {
        self.source_batch_size
            .unwrap_or(DEFAULT_SOURCE_BATCH_SIZE)
            .max(1) as usize
    }

    pub fn fetch_item_delay(&self) -> Duration {
        Duration::from_millis(
            self.fetch_item_delay_ms
                .unwrap_or(DEFAULT_FETCH_ITEM_DELAY_MS),
        )
    }

    pub fn convert_item_delay(&self) -> Duration {
        Duration::from_millis(
            self.convert_item_delay_ms
                .unwrap_or(DEFAULT_CONVERT_ITEM_DELAY_MS),
        )
    }

    pub fn upload_item_delay(&self) -> Duration {
        Duration::from_millis(
            self.upload_item_delay_ms
                .unwrap_or(DEFAULT_UPLOAD_ITEM_DELAY_MS),
        )
    }

    pub fn finish_delay(&self) -> Duration {
        Duration::from_millis(self.finish_delay_ms.unwrap_or(DEFAULT_FINISH_DELAY_MS))
    }

    pub fn listing_ttl(&self) -> Option<Duration> {
        self.listing_ttl_secs.map(Duration::from_secs)
    }

    /// Merge a partial update, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(limit) = other.fetch_no_progress_limit {
            self.fetch_no_progress_limit = limit;
        }
        if let Some(size) = other.source_batch_size {
            self.source_batch_size = size;
        }
        if let Some(delay) = other.fetch_item_delay_ms {
            self.fetch_item_delay_ms = delay;
        }
        if let Some(delay) = other.convert_item_delay_ms {
            self.convert_item_delay_ms = delay;
        }
        if let Some(delay) = other.upload_item_delay_ms {
            self.upload_item_delay_ms = delay;
        }
        if let Some(delay) = other.finish_delay_ms {
            self.finish_delay_ms = delay;
        }
        if let Some(ref output) = other.default_output {
            self.default_output.clone_from(output);
        }
        if let Some(ttl) = other.listing_ttl_secs {
            self.listing_ttl_secs = ttl;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset to the default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub fetch_no_progress_limit: Option<Option<u32>>,
    pub source_batch_size: Option<Option<u32>>,
    pub fetch_item_delay_ms: Option<Option<u64>>,
    pub convert_item_delay_ms: Option<Option<u64>>,
    pub upload_item_delay_ms: Option<Option<u64>>,
    pub finish_delay_ms: Option<Option<u64>>,
    pub default_output: Option<Option<String>>,
    pub listing_ttl_secs: Option<Option<u64>>,
}

impl SettingsUpdate {
    pub const fn is_empty(&self) -> bool {
        self.fetch_no_progress_limit.is_none()
            && self.source_batch_size.is_none()
            && self.fetch_item_delay_ms.is_none()
            && self.convert_item_delay_ms.is_none()
            && self.upload_item_delay_ms.is_none()
            && self.finish_delay_ms.is_none()
            && self.default_output.is_none()
            && self.listing_ttl_secs.is_none()
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("No-progress limit must be between 1 and 100, got {0}")]
    InvalidNoProgressLimit(u32),

    #[error("Source batch size must be between 1 and 1000, got {0}")]
    InvalidBatchSize(u32),

    #[error("{name} must be at most 60000 ms, got {value}")]
    InvalidDelay { name: &'static str, value: u64 },

    #[error("Default output cannot be empty")]
    EmptyOutput,

    #[error("Listing TTL must be between 1 and 604800 seconds, got {0}")]
    InvalidListingTtl(u64),
}

const MAX_DELAY_MS: u64 = 60_000;

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(limit) = settings.fetch_no_progress_limit {
        if !(1..=100).contains(&limit) {
            return Err(SettingsError::InvalidNoProgressLimit(limit));
        }
    }

    if let Some(size) = settings.source_batch_size {
        if !(1..=1000).contains(&size) {
            return Err(SettingsError::InvalidBatchSize(size));
        }
    }

    let delays = [
        ("fetch_item_delay_ms", settings.fetch_item_delay_ms),
        ("convert_item_delay_ms", settings.convert_item_delay_ms),
        ("upload_item_delay_ms", settings.upload_item_delay_ms),
        ("finish_delay_ms", settings.finish_delay_ms),
    ];
    for (name, value) in delays {
        if let Some(value) = value {
            if value > MAX_DELAY_MS {
                return Err(SettingsError::InvalidDelay { name, value });
            }
        }
    }

    if settings
        .default_output
        .as_ref()
        .is_some_and(|o| o.trim().is_empty())
    {
        return Err(SettingsError::EmptyOutput);
    }

    if let Some(ttl) = settings.listing_ttl_secs {
        if !(1..=MAX_LISTING_TTL_SECS).contains(&ttl) {
            return Err(SettingsError::InvalidListingTtl(ttl));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.fetch_no_progress_limit, Some(5));
        assert_eq!(settings.source_batch_size, Some(100));
        assert_eq!(settings.fetch_item_delay(), Duration::from_millis(100));
        assert_eq!(settings.convert_item_delay(), Duration::from_secs(1));
        assert_eq!(settings.upload_item_delay(), Duration::from_secs(1));
        assert_eq!(settings.finish_delay(), Duration::ZERO);
    }

    #[test]
    fn test_effective_values_fall_back_to_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.effective_no_progress_limit(), 5);
        assert_eq!(settings.effective_batch_size(), 100);
        assert_eq!(settings.fetch_item_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_without_delays() {
        let settings = Settings::without_delays();
        assert_eq!(settings.fetch_item_delay(), Duration::ZERO);
        assert_eq!(settings.convert_item_delay(), Duration::ZERO);
        assert_eq!(settings.upload_item_delay(), Duration::ZERO);
        assert_eq!(settings.effective_no_progress_limit(), 5);
    }

    #[test]
    fn test_validate_settings_valid() {
        assert!(validate_settings(&Settings::with_defaults()).is_ok());
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_validate_no_progress_limit() {
        let settings = Settings {
            fetch_no_progress_limit: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidNoProgressLimit(0))
        ));
    }

    #[test]
    fn test_validate_batch_size() {
        let settings = Settings {
            source_batch_size: Some(5000),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidBatchSize(5000))
        ));
    }

    #[test]
    fn test_validate_delay() {
        let settings = Settings {
            upload_item_delay_ms: Some(120_000),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidDelay {
                name: "upload_item_delay_ms",
                value: 120_000
            })
        ));
    }

    #[test]
    fn test_validate_empty_output() {
        let settings = Settings {
            default_output: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::EmptyOutput)
        ));
    }

    #[test]
    fn test_listing_ttl() {
        assert_eq!(Settings::with_defaults().listing_ttl(), None);

        let settings = Settings {
            listing_ttl_secs: Some(300),
            ..Default::default()
        };
        assert_eq!(settings.listing_ttl(), Some(Duration::from_secs(300)));
        assert!(validate_settings(&settings).is_ok());

        let settings = Settings {
            listing_ttl_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidListingTtl(0))
        ));
    }

    #[test]
    fn test_merge_settings() {
        let mut settings = Settings::with_defaults();
        let update = SettingsUpdate {
            source_batch_size: Some(Some(20)),
            fetch_item_delay_ms: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
        settings.merge(&update);

        assert_eq!(settings.source_batch_size, Some(20));
        assert_eq!(settings.fetch_item_delay_ms, None);
        assert_eq!(settings.fetch_item_delay(), Duration::from_millis(100));
        assert_eq!(settings.fetch_no_progress_limit, Some(5));
    }
}

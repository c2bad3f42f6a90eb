//! Pipeline error taxonomy.

use serde_json::Value;
use thiserror::Error;

use crate::ports::{RenderError, SinkError, SourceError, StoreError};

/// Errors surfaced by the fetch, convert and upload stages.
///
/// Persisted state is left intact on every variant: re-running the stage
/// resumes from what is already durable.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source failed; transient.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A raw item carries a type tag no render strategy handles.
    #[error("Unsupported item type {tag} for item {}", item_id(.item))]
    UnsupportedType { tag: i64, item: Value },

    /// A raw item lacks a sub-field its render strategy requires.
    #[error("Item {item_id} failed validation: {message}")]
    Validation { item_id: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Delivery failed; the upload cursor is re-derived on the next run.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Stage stopped between items at the caller's request.
    #[error("Cancelled")]
    Cancelled,

    /// The synthetic ALL sheet was passed where a concrete sheet is needed.
    #[error("The ALL sheet cannot be processed directly; run each sheet instead")]
    AggregateSheet,
}

impl SyncError {
    pub fn validation(item_id: impl Into<String>, error: &RenderError) -> Self {
        Self::Validation {
            item_id: item_id.into(),
            message: error.to_string(),
        }
    }

    /// Whether re-running the same stage may succeed without intervention.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Sink(_) | Self::Cancelled)
    }
}

fn item_id(item: &Value) -> String {
    match item.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<unknown>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unsupported_type_message_names_item() {
        let err = SyncError::UnsupportedType {
            tag: 2053,
            item: json!({"id": "17", "type": 2053}),
        };
        assert_eq!(err.to_string(), "Unsupported item type 2053 for item 17");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_validation_from_render_error() {
        let err = SyncError::validation("9", &RenderError::MissingField("answer"));
        assert_eq!(
            err.to_string(),
            "Item 9 failed validation: missing required field `answer`"
        );
    }

    #[test]
    fn test_source_errors_are_transient() {
        let err = SyncError::from(SourceError::Unavailable("timeout".into()));
        assert!(err.is_transient());
    }
}

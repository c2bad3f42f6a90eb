//! Internal errors of the JSON file vendor.
//!
//! Mapped to [`SourceError`] at the port boundary.

use qsync_core::SourceError;
use thiserror::Error;

pub type JsonFileResult<T> = Result<T, JsonFileError>;

#[derive(Debug, Error)]
pub enum JsonFileError {
    /// The document or the sidecar could not be read or written.
    #[error("Cannot access {path}: {message}")]
    Io { path: String, message: String },

    /// The document is not valid JSON or has the wrong shape.
    #[error("Invalid document: {0}")]
    Parse(String),

    #[error("Bank '{0}' not found in document")]
    UnknownBank(String),

    #[error("Category '{category}' not found in bank '{bank}'")]
    UnknownCategory { bank: String, category: String },
}

impl JsonFileError {
    pub(crate) fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<JsonFileError> for SourceError {
    fn from(err: JsonFileError) -> Self {
        match err {
            JsonFileError::Io { .. } => Self::Unavailable(err.to_string()),
            JsonFileError::Parse(_) => Self::Malformed(err.to_string()),
            JsonFileError::UnknownBank(_) | JsonFileError::UnknownCategory { .. } => {
                Self::NotFound(err.to_string())
            }
        }
    }
}

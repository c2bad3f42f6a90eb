//! CLI-specific error types and mappings.
//!
//! Library errors are folded into [`CliError`] so `main` can pick an exit
//! code without knowing where a failure came from.

use qsync_core::{CatalogError, CoreError, PathError, SourceError, StoreError, SyncError};
use qsync_vendors::RegistryError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A pipeline stage failed in a way re-running will not fix.
    #[error("{0}")]
    Pipeline(String),

    /// Argument parsing or resource matching error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// The vendor could not be reached or refused the request.
    #[error("Vendor error: {0}")]
    Vendor(String),

    /// IO error while delivering or reading files.
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Interrupted by the user.
    #[error("Interrupted")]
    Cancelled,
}

impl CliError {
    /// Map error to an exit code following sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Pipeline(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Vendor(_) => 69,   // EX_UNAVAILABLE
            Self::Database(_) => 73, // EX_CANTCREAT (closest fit)
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Cancelled => 130,
        }
    }

    /// Exit code for any error reaching `main`.
    pub fn exit_code_of(err: &anyhow::Error) -> i32 {
        err.downcast_ref::<Self>().map_or(1, Self::exit_code)
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Source(e) => e.into(),
            SyncError::Store(e) => e.into(),
            SyncError::Sink(e) => Self::Io(e.to_string()),
            SyncError::Cancelled => Self::Cancelled,
            SyncError::AggregateSheet => Self::Arguments(err.to_string()),
            SyncError::UnsupportedType { .. } | SyncError::Validation { .. } => {
                Self::Pipeline(err.to_string())
            }
        }
    }
}

impl From<SourceError> for CliError {
    fn from(err: SourceError) -> Self {
        Self::Vendor(err.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Source(e) => e.into(),
            CatalogError::Store(e) => e.into(),
            CatalogError::NotLoggedIn { .. } => Self::Config(err.to_string()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Store(e) => e.into(),
            CoreError::Settings(e) => Self::Config(e.to_string()),
        }
    }
}

impl From<RegistryError> for CliError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownVendor(_)
            | RegistryError::UnknownOutput(_)
            | RegistryError::OutputNotAllowed { .. } => Self::Arguments(err.to_string()),
            RegistryError::MissingDocument(_) => Self::Config(err.to_string()),
            RegistryError::JsonFile(e) => SourceError::from(e).into(),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

//! The closed set of vendors and the outputs each one allows.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use qsync_core::{CatalogPort, SourcePort};
use thiserror::Error;

use crate::json_file::{DEFAULT_BATCH_SIZE, JsonFileConfig, JsonFileError, JsonFileSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorKind {
    JsonFile,
}

impl VendorKind {
    pub const ALL: [Self; 1] = [Self::JsonFile];

    pub const fn key(self) -> &'static str {
        match self {
            Self::JsonFile => "json-file",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::JsonFile => "JSON file",
        }
    }

    pub const fn allowed_outputs(self) -> &'static [OutputKind] {
        match self {
            Self::JsonFile => &[OutputKind::Markdown, OutputKind::Skip],
        }
    }

    pub fn parse(key: &str) -> Result<Self, RegistryError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| RegistryError::UnknownVendor(key.to_string()))
    }

    /// Resolve an output key against the outputs this vendor allows.
    pub fn output(self, key: &str) -> Result<OutputKind, RegistryError> {
        let output = OutputKind::parse(key)?;
        if self.allowed_outputs().contains(&output) {
            Ok(output)
        } else {
            Err(RegistryError::OutputNotAllowed {
                vendor: self.key(),
                output: output.key(),
            })
        }
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Markdown,
    Skip,
}

impl OutputKind {
    pub const ALL: [Self; 2] = [Self::Markdown, Self::Skip];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Skip => "skip",
        }
    }

    pub fn parse(key: &str) -> Result<Self, RegistryError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| RegistryError::UnknownOutput(key.to_string()))
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown vendor '{0}'")]
    UnknownVendor(String),

    #[error("Unknown output '{0}'")]
    UnknownOutput(String),

    #[error("Vendor '{vendor}' does not support output '{output}'")]
    OutputNotAllowed {
        vendor: &'static str,
        output: &'static str,
    },

    #[error("Vendor '{0}' needs a document path (--source-file or QSYNC_SOURCE_FILE)")]
    MissingDocument(&'static str),

    #[error(transparent)]
    JsonFile(#[from] JsonFileError),
}

/// What a vendor constructor may need.
#[derive(Debug, Clone, Default)]
pub struct VendorOptions {
    pub document: Option<PathBuf>,
    pub batch_size: Option<usize>,
}

/// An opened vendor, exposed through both of its ports.
#[derive(Clone)]
pub struct Vendor {
    pub kind: VendorKind,
    pub source: Arc<dyn SourcePort>,
    pub catalog: Arc<dyn CatalogPort>,
}

impl fmt::Debug for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vendor").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// Construct the vendor registered under `kind`.
pub async fn open_vendor(kind: VendorKind, options: &VendorOptions) -> Result<Vendor, RegistryError> {
    match kind {
        VendorKind::JsonFile => {
            let path = options
                .document
                .clone()
                .ok_or(RegistryError::MissingDocument(kind.key()))?;
            let config = JsonFileConfig::new(path)
                .with_batch_size(options.batch_size.unwrap_or(DEFAULT_BATCH_SIZE));
            let source = Arc::new(JsonFileSource::open(config).await?);
            Ok(Vendor {
                kind,
                source: source.clone(),
                catalog: source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for kind in VendorKind::ALL {
            assert_eq!(VendorKind::parse(kind.key()).unwrap(), kind);
        }
        assert!(matches!(
            VendorKind::parse("fenbi"),
            Err(RegistryError::UnknownVendor(_))
        ));
    }

    #[test]
    fn test_output_resolution() {
        assert_eq!(
            VendorKind::JsonFile.output("markdown").unwrap(),
            OutputKind::Markdown
        );
        assert_eq!(VendorKind::JsonFile.output("skip").unwrap(), OutputKind::Skip);
        assert!(matches!(
            VendorKind::JsonFile.output("anki"),
            Err(RegistryError::UnknownOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_json_file_needs_document() {
        let err = open_vendor(VendorKind::JsonFile, &VendorOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingDocument("json-file")));
    }
}

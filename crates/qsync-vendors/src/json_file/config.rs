//! Configuration for the JSON file vendor.

use std::path::{Path, PathBuf};

/// Items per leased batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Where the document lives and how it is handed out.
///
/// # Example
///
/// ```
/// use qsync_vendors::JsonFileConfig;
///
/// let config = JsonFileConfig::new("/data/bank.json").with_batch_size(20);
/// assert_eq!(config.batch_size(), 20);
/// assert!(config.sidecar_path().ends_with("bank.json.acks.json"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileConfig {
    pub(crate) path: PathBuf,
    pub(crate) batch_size: usize,
    pub(crate) sidecar: Option<PathBuf>,
}

impl JsonFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            sidecar: None,
        }
    }

    /// Items per batch. Zero is raised to one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Record acknowledgements somewhere other than next to the document.
    #[must_use]
    pub fn with_sidecar(mut self, path: impl Into<PathBuf>) -> Self {
        self.sidecar = Some(path.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// `<document>.acks.json` unless overridden.
    pub fn sidecar_path(&self) -> PathBuf {
        self.sidecar.clone().unwrap_or_else(|| {
            let mut name = self.path.file_name().unwrap_or_default().to_os_string();
            name.push(".acks.json");
            self.path.with_file_name(name)
        })
    }
}

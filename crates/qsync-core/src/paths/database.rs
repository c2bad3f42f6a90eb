//! Database path resolution.

use std::path::{Path, PathBuf};

use super::ensure::ensure_directory;
use super::error::PathError;
use super::platform::data_root;

pub const DATABASE_FILE_NAME: &str = "qsync.db";

/// Get the path to the cache database, `<data root>/data/qsync.db`.
///
/// The `data/` subdirectory is created if it doesn't exist.
pub fn database_path() -> Result<PathBuf, PathError> {
    database_path_in(&data_root()?)
}

pub(super) fn database_path_in(root: &Path) -> Result<PathBuf, PathError> {
    let data_dir = root.join("data");
    ensure_directory(&data_dir)?;
    Ok(data_dir.join(DATABASE_FILE_NAME))
}

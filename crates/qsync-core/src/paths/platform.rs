//! Data root resolution.

use std::env;
use std::path::{Path, PathBuf};

use super::ensure::ensure_directory;
use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "QSYNC_DATA_DIR";

/// Get the root directory for application data (database, output, `.env`).
///
/// Resolution order:
/// 1. `QSYNC_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/qsync`)
///
/// The directory is created if missing.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = data_root_from(env::var(DATA_DIR_ENV).ok().as_deref(), dirs::data_local_dir())?;
    ensure_directory(&root)?;
    Ok(root)
}

/// Pure resolution step behind [`data_root`].
pub fn data_root_from(
    override_dir: Option<&str>,
    system_dir: Option<PathBuf>,
) -> Result<PathBuf, PathError> {
    if let Some(dir) = override_dir {
        let trimmed = dir.trim();
        if trimmed.is_empty() {
            return Err(PathError::EmptyPath);
        }
        return Ok(PathBuf::from(trimmed));
    }
    system_dir
        .map(|dir| dir.join("qsync"))
        .ok_or(PathError::NoDataDir)
}

/// Location of the `.env` file loaded at startup.
pub fn env_file_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(".env"))
}

/// Default directory sinks deliver into, under `root`.
pub fn output_root(root: &Path) -> PathBuf {
    root.join("output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let root = data_root_from(Some("/tmp/q"), Some(PathBuf::from("/home/x/.local/share")));
        assert_eq!(root.unwrap(), PathBuf::from("/tmp/q"));
    }

    #[test]
    fn test_system_dir_fallback() {
        let root = data_root_from(None, Some(PathBuf::from("/home/x/.local/share"))).unwrap();
        assert_eq!(root, PathBuf::from("/home/x/.local/share/qsync"));
    }

    #[test]
    fn test_blank_override_is_rejected() {
        assert!(matches!(
            data_root_from(Some("  "), None),
            Err(PathError::EmptyPath)
        ));
    }

    #[test]
    fn test_no_system_dir() {
        assert!(matches!(data_root_from(None, None), Err(PathError::NoDataDir)));
    }
}

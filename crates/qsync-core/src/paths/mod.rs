//! Path utilities for qsync data directories.
//!
//! Canonical locations for the cache database, the `.env` file and sink
//! output. Returns `PathBuf` and `PathError`; no interactive I/O.

mod database;
mod ensure;
mod error;
mod platform;

pub use database::{DATABASE_FILE_NAME, database_path};
pub use ensure::ensure_directory;
pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root, data_root_from, env_file_path, output_root};

#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]

mod config;
pub mod convert;
pub mod fetch;
mod pacing;
pub mod upload;

pub use config::{ConvertConfig, FetchConfig, UploadConfig};
pub use convert::{ConvertDeps, ConvertJob, ConvertSummary, run_convert};
pub use fetch::{FetchDeps, FetchJob, FetchSummary, run_fetch};
pub use upload::{UploadDeps, UploadJob, UploadSummary, run_upload};

// Re-export core types for convenience
pub use qsync_core::{ProgressReceiver, ProgressSender, SyncError, progress_channel};
pub use tokio_util::sync::CancellationToken;

//! Key pattern matching for the in-memory store.
//!
//! Patterns follow `SQLite` `GLOB`: `*` spans any run of characters,
//! separators included, and there is no backslash escape. Key segments are
//! percent-encoded (see [`crate::keys`]), so the only live metacharacters in
//! a scan pattern are the ones the key builders put there.

use globset::{GlobBuilder, GlobMatcher};

use crate::ports::StoreError;

pub fn key_matcher(pattern: &str) -> Result<GlobMatcher, StoreError> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(false)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| StoreError::Storage(format!("invalid key pattern {pattern:?}: {e}")))
}

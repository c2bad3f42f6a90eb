//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn <command>(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Resolve names to resources, call a service or engine, print the outcome
//!
//! Handlers never open stores or vendors themselves; the context does.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod login;
pub mod paths;
pub mod pipeline;
pub mod select;

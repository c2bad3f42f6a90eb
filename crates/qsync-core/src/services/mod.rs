//! Core services orchestrating ports.

mod catalog;
mod settings_service;

pub use catalog::{CatalogError, CatalogService};
pub use settings_service::SettingsService;

//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - SQLite pool, cache store and settings repository (via qsync-db)
//! - the vendor selected on the command line (via the qsync-vendors registry)
//! - the catalog and settings services (via qsync-core)
//!
//! The vendor is opened on first use so commands that never talk to it
//! (`paths`, `config`, `cache`) work without a source document.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use qsync_core::paths::{data_root, database_path};
use qsync_core::{CatalogService, Settings, SettingsService, Stores};
use qsync_db::{StoreFactory, setup_database};
use qsync_engine::CancellationToken;
use qsync_vendors::{Vendor, VendorKind, VendorOptions, open_vendor};
use tokio::sync::OnceCell;

use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub vendor: VendorKind,
    pub username: String,
    pub source_file: Option<PathBuf>,
}

impl CliConfig {
    /// Take the global options of a parsed command line.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        Ok(Self {
            vendor: VendorKind::parse(&cli.vendor)?,
            username: cli.username.clone(),
            source_file: cli.source_file.clone(),
        })
    }
}

/// An opened vendor and the catalog listing it.
pub struct VendorSession {
    pub vendor: Vendor,
    pub catalog: CatalogService,
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub config: CliConfig,
    pub stores: Stores,
    pub settings: SettingsService,
    pub data_root: PathBuf,
    /// Cancelled on Ctrl-C; engines stop between items.
    pub cancel: CancellationToken,
    session: OnceCell<VendorSession>,
}

impl CliContext {
    /// The vendor session, opening the vendor on first call.
    pub async fn session(&self) -> Result<&VendorSession, CliError> {
        self.session
            .get_or_try_init(|| async {
                let options = VendorOptions {
                    document: self.config.source_file.clone(),
                    batch_size: None,
                };
                let vendor = open_vendor(self.config.vendor, &options).await?;
                let mut catalog = CatalogService::new(
                    vendor.kind.key(),
                    vendor.catalog.clone(),
                    self.stores.cache.clone(),
                );
                if let Some(ttl) = self.current_settings().await?.listing_ttl() {
                    catalog = catalog.with_listing_ttl(ttl);
                }
                tracing::debug!(vendor = %vendor.kind, "Vendor opened");
                Ok(VendorSession { vendor, catalog })
            })
            .await
    }

    /// Current pipeline settings.
    pub async fn current_settings(&self) -> Result<Settings, CliError> {
        Ok(self.settings.current().await?)
    }
}

/// Bootstrap the CLI application.
///
/// 1. Resolves the data root and opens the cache database
/// 2. Builds the stores and the settings service
/// 3. Installs the Ctrl-C handler feeding the cancellation token
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let root = data_root().map_err(CliError::from)?;
    let db_path = database_path().map_err(CliError::from)?;
    let pool = setup_database(&db_path)
        .await
        .map_err(|e| CliError::Database(format!("{e:#}")))
        .with_context(|| format!("opening {}", db_path.display()))?;

    let ctx = bootstrap_with(config, StoreFactory::build_stores(pool), root);

    let token = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current item");
            token.cancel();
        }
    });

    Ok(ctx)
}

/// Compose a context from existing stores (for testing).
pub fn bootstrap_with(config: CliConfig, stores: Stores, data_root: PathBuf) -> CliContext {
    CliContext {
        settings: SettingsService::new(Arc::clone(&stores.settings)),
        config,
        stores,
        data_root,
        cancel: CancellationToken::new(),
        session: OnceCell::new(),
    }
}

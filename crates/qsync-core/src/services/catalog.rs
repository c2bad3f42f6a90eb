//! Catalog service: cached, normalized bank/category/sheet listings.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::{AGGREGATE_ID, Bank, Category, LoginSession, PLACEHOLDER_ID, Sheet};
use crate::keys::{self, CacheScope};
use crate::listing::{ListOptions, normalize};
use crate::ports::cache_store::{load, save};
use crate::ports::{CacheStorePort, CatalogPort, SourceError, StoreError};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Not logged in to {vendor} as {username}; run `qsync login -v {vendor} -u {username} --password ...` first")]
    NotLoggedIn { vendor: String, username: String },
}

/// Listings for one vendor, cached in the store.
///
/// A cache hit returns the stored normalized listing; `refresh` invalidates
/// the scope and asks the vendor again.
pub struct CatalogService {
    vendor: String,
    catalog: Arc<dyn CatalogPort>,
    store: Arc<dyn CacheStorePort>,
    listing_ttl: Option<Duration>,
}

impl CatalogService {
    pub fn new(
        vendor: impl Into<String>,
        catalog: Arc<dyn CatalogPort>,
        store: Arc<dyn CacheStorePort>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            catalog,
            store,
            listing_ttl: None,
        }
    }

    /// Expire cached listings after `ttl`.
    #[must_use]
    pub const fn with_listing_ttl(mut self, ttl: Duration) -> Self {
        self.listing_ttl = Some(ttl);
        self
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Banks, without an aggregate entry.
    pub async fn banks(&self, refresh: bool) -> Result<Vec<Bank>, CatalogError> {
        let scope = CacheScope::Banks {
            vendor: &self.vendor,
        };
        self.cached(scope, refresh, || async move {
            let banks = self.catalog.list_banks().await?;
            Ok(normalize(&banks, ListOptions::new().without_aggregate()))
        })
        .await
    }

    /// Category tree of `bank`, with aggregates, de-duplicated names and
    /// the `fetched` flag derived from the cache.
    pub async fn categories(
        &self,
        bank: &Bank,
        refresh: bool,
    ) -> Result<Vec<Category>, CatalogError> {
        let scope = CacheScope::Categories {
            vendor: &self.vendor,
            bank: &bank.id,
        };
        let categories = self
            .cached(scope, refresh, || async move {
                let categories = self.catalog.list_categories(bank).await?;
                Ok(normalize(&categories, ListOptions::new().with_dedup()))
            })
            .await?;

        let mut marked = Vec::with_capacity(categories.len());
        for category in categories {
            marked.push(self.mark_fetched(&bank.id, category).await?);
        }
        Ok(mark_aggregates(marked))
    }

    /// Sheets of a category, with an aggregate entry.
    pub async fn sheets(
        &self,
        bank: &Bank,
        category: &Category,
        refresh: bool,
    ) -> Result<Vec<Sheet>, CatalogError> {
        let scope = CacheScope::Sheets {
            vendor: &self.vendor,
            bank: &bank.id,
            category: &category.id,
        };
        self.cached(scope, refresh, || async move {
            let sheets = self.catalog.list_sheets(bank, category).await?;
            Ok(normalize(&sheets, ListOptions::new()))
        })
        .await
    }

    /// Log in with `password`, or return the cached session without one.
    pub async fn login(
        &self,
        username: &str,
        password: Option<&str>,
    ) -> Result<LoginSession, CatalogError> {
        let key = CacheScope::Login {
            vendor: &self.vendor,
            username,
        }
        .key();

        if let Some(password) = password {
            let session = self.catalog.login(username, password).await?;
            let session = LoginSession::new(username, session);
            save(self.store.as_ref(), &key, &session, None).await?;
            tracing::info!(target: "qsync.catalog", vendor = %self.vendor, username, "Logged in");
            return Ok(session);
        }

        load(self.store.as_ref(), &key)
            .await?
            .ok_or_else(|| CatalogError::NotLoggedIn {
                vendor: self.vendor.clone(),
                username: username.to_string(),
            })
    }

    /// Drop a cached scope. Returns the number of keys removed.
    pub async fn invalidate(&self, scope: &CacheScope<'_>) -> Result<u64, CatalogError> {
        Ok(keys::invalidate(self.store.as_ref(), scope).await?)
    }

    async fn cached<T, F, Fut>(
        &self,
        scope: CacheScope<'_>,
        refresh: bool,
        fetch: F,
    ) -> Result<Vec<T>, CatalogError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, CatalogError>>,
    {
        let key = scope.key();
        if refresh {
            keys::invalidate(self.store.as_ref(), &scope).await?;
        } else if let Some(cached) = load::<Vec<T>>(self.store.as_ref(), &key).await? {
            tracing::debug!(target: "qsync.catalog", key = %key, "Listing cache hit");
            return Ok(cached);
        }

        let listing = fetch().await?;
        save(self.store.as_ref(), &key, &listing, self.listing_ttl).await?;
        tracing::debug!(
            target: "qsync.catalog",
            key = %key,
            entries = listing.len(),
            "Listing cached"
        );
        Ok(listing)
    }

    async fn mark_fetched(&self, bank: &str, mut category: Category) -> Result<Category, CatalogError> {
        if category.id != AGGREGATE_ID && category.id != PLACEHOLDER_ID {
            let pattern = keys::category_items_pattern(&self.vendor, bank, &category.id);
            let have = self.store.keys(&pattern).await?.len() as u64;
            category.fetched = have >= category.count;
        }

        let children = std::mem::take(&mut category.children);
        let mut marked = Vec::with_capacity(children.len());
        for child in children {
            marked.push(Box::pin(self.mark_fetched(bank, child)).await?);
        }
        category.children = mark_aggregates(marked);
        Ok(category)
    }
}

/// An aggregate is fetched when every real sibling is.
fn mark_aggregates(mut level: Vec<Category>) -> Vec<Category> {
    let all_fetched = level
        .iter()
        .filter(|c| c.id != AGGREGATE_ID)
        .all(|c| c.fetched);
    for category in &mut level {
        if category.id == AGGREGATE_ID {
            category.fetched = all_fetched;
        }
    }
    level
}

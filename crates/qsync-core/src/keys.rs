//! Cache key namespace.
//!
//! Every key is `<vendor>:<scope>[:<segment>...]`. Segment values are
//! percent-encoded for `:`, `%` and every glob metacharacter, so an id can
//! never forge a separator or act as a wildcard in a scan pattern.
//!
//! Raw items and fetch checkpoints share the `origin-items` scope but live in
//! distinct sub-namespaces (`item` and `processing`); a scan of one never
//! returns keys of the other.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::domain::{ArtifactCoordinate, SheetCoordinate};
use crate::ports::{CacheStorePort, StoreError};

const SEP: char = ':';
const ITEM: &str = "item";
const PROCESSING: &str = "processing";

/// The fixed vocabulary of cache scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScope {
    Banks,
    Categories,
    Sheets,
    Login,
    OriginItems,
    Items,
}

impl KeyScope {
    pub const ALL: [Self; 6] = [
        Self::Banks,
        Self::Categories,
        Self::Sheets,
        Self::Login,
        Self::OriginItems,
        Self::Items,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Banks => "banks",
            Self::Categories => "categories",
            Self::Sheets => "sheets",
            Self::Login => "login",
            Self::OriginItems => "origin-items",
            Self::Items => "items",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scope| scope.as_str() == s)
    }
}

/// A scope together with the coordinate it is addressed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope<'a> {
    Banks {
        vendor: &'a str,
    },
    Categories {
        vendor: &'a str,
        bank: &'a str,
    },
    Sheets {
        vendor: &'a str,
        bank: &'a str,
        category: &'a str,
    },
    Login {
        vendor: &'a str,
        username: &'a str,
    },
    OriginItems(&'a SheetCoordinate),
    Items(&'a ArtifactCoordinate),
}

impl CacheScope<'_> {
    pub const fn scope(&self) -> KeyScope {
        match self {
            Self::Banks { .. } => KeyScope::Banks,
            Self::Categories { .. } => KeyScope::Categories,
            Self::Sheets { .. } => KeyScope::Sheets,
            Self::Login { .. } => KeyScope::Login,
            Self::OriginItems(_) => KeyScope::OriginItems,
            Self::Items(_) => KeyScope::Items,
        }
    }

    pub fn vendor(&self) -> &str {
        match *self {
            Self::Banks { vendor }
            | Self::Categories { vendor, .. }
            | Self::Sheets { vendor, .. }
            | Self::Login { vendor, .. } => vendor,
            Self::OriginItems(sheet) => sheet.vendor.as_str(),
            Self::Items(artifact) => artifact.sheet.vendor.as_str(),
        }
    }

    /// The key of this scope at this coordinate.
    ///
    /// For list scopes this is where the listing itself is stored; for item
    /// scopes it is the prefix every item key extends.
    pub fn key(&self) -> String {
        let segments: Vec<&str> = match *self {
            Self::Banks { .. } => vec![],
            Self::Categories { bank, .. } => vec![bank],
            Self::Sheets { bank, category, .. } => vec![bank, category],
            Self::Login { username, .. } => vec![username],
            Self::OriginItems(sheet) => vec![
                sheet.bank.as_str(),
                sheet.category.as_str(),
                sheet.sheet.as_str(),
            ],
            Self::Items(artifact) => vec![
                artifact.sheet.bank.as_str(),
                artifact.sheet.category.as_str(),
                artifact.sheet.sheet.as_str(),
                artifact.output.as_str(),
            ],
        };
        join(self.vendor(), self.scope(), &segments)
    }
}

/// Key of one finalized raw item.
pub fn origin_item(sheet: &SheetCoordinate, item_id: &str) -> String {
    format!(
        "{}{SEP}{ITEM}{SEP}{}",
        CacheScope::OriginItems(sheet).key(),
        encode_segment(item_id)
    )
}

/// Pattern matching every finalized raw item of a sheet.
pub fn origin_items_pattern(sheet: &SheetCoordinate) -> String {
    format!("{}{SEP}{ITEM}{SEP}*", CacheScope::OriginItems(sheet).key())
}

/// Pattern matching every finalized raw item of a category, across sheets.
pub fn category_items_pattern(vendor: &str, bank: &str, category: &str) -> String {
    format!(
        "{}{SEP}*{SEP}{ITEM}{SEP}*",
        join(vendor, KeyScope::OriginItems, &[bank, category])
    )
}

/// Key of an in-flight fetch checkpoint.
pub fn checkpoint(sheet: &SheetCoordinate, batch_scope: &str, batch_id: &str) -> String {
    format!(
        "{}{SEP}{PROCESSING}{SEP}{}{SEP}{}",
        CacheScope::OriginItems(sheet).key(),
        encode_segment(batch_scope),
        encode_segment(batch_id)
    )
}

/// Pattern matching every in-flight checkpoint of a sheet.
pub fn checkpoints_pattern(sheet: &SheetCoordinate, batch_scope: &str) -> String {
    format!(
        "{}{SEP}{PROCESSING}{SEP}{}{SEP}*",
        CacheScope::OriginItems(sheet).key(),
        encode_segment(batch_scope)
    )
}

/// Key of one rendered artifact.
pub fn artifact(coordinate: &ArtifactCoordinate, item_id: &str) -> String {
    format!(
        "{}{SEP}{ITEM}{SEP}{}",
        CacheScope::Items(coordinate).key(),
        encode_segment(item_id)
    )
}

/// Pattern matching every artifact of a sheet for one output.
pub fn artifacts_pattern(coordinate: &ArtifactCoordinate) -> String {
    format!("{}{SEP}{ITEM}{SEP}*", CacheScope::Items(coordinate).key())
}

/// Recover the decoded id from the last segment of an item or checkpoint key.
pub fn id_from_key(key: &str) -> Option<String> {
    key.rsplit_once(SEP)
        .map(|(_, last)| decode_segment(last))
        .filter(|id| !id.is_empty())
}

/// Decoded ids of every key matching `pattern`.
pub async fn scan_ids(store: &dyn CacheStorePort, pattern: &str) -> Result<Vec<String>, StoreError> {
    let keys = store.keys(pattern).await?;
    Ok(keys.iter().filter_map(|key| id_from_key(key)).collect())
}

/// Remove a scope's data.
///
/// `login` is deleted exactly. Every other scope deletes the key itself and
/// everything nested under it. Returns the number of keys removed.
pub async fn invalidate(
    store: &dyn CacheStorePort,
    scope: &CacheScope<'_>,
) -> Result<u64, StoreError> {
    let key = scope.key();
    let removed = u64::from(store.delete(&key).await?);
    if scope.scope() == KeyScope::Login {
        return Ok(removed);
    }
    let nested = store.delete_by_prefix(&format!("{key}{SEP}*")).await?;
    tracing::debug!(
        target: "qsync.cache",
        scope = scope.scope().as_str(),
        key = %key,
        removed = removed + nested,
        "Invalidated cache scope"
    );
    Ok(removed + nested)
}

fn join(vendor: &str, scope: KeyScope, segments: &[&str]) -> String {
    let mut key = String::new();
    key.push_str(&encode_segment(vendor));
    key.push(SEP);
    key.push_str(scope.as_str());
    for segment in segments {
        key.push(SEP);
        key.push_str(&encode_segment(segment));
    }
    key
}

/// Structural in keys (`:`) or in `GLOB` scan patterns, plus `%` itself.
/// Non-ASCII characters are always encoded.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b'%')
    .add(b':')
    .add(b'*')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'{')
    .add(b'}')
    .add(b'\\');

/// Percent-encode the characters that are structural in keys or patterns.
pub fn encode_segment(raw: &str) -> Cow<'_, str> {
    utf8_percent_encode(raw, SEGMENT).into()
}

/// Inverse of [`encode_segment`]. Malformed escapes are kept verbatim.
pub fn decode_segment(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}

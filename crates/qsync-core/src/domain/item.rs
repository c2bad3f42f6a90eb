//! Raw items, rendered artifacts and fetch checkpoints.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Closed set of item kinds the render registry knows about.
///
/// Sources report a numeric type tag; anything outside this set is rejected
/// during conversion rather than rendered badly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    SingleChoice,
    MultipleChoice,
    Cloze,
    TrueOrFalse,
    ReadingComprehension,
    BlankFilling,
    Translation,
    Essay,
    ShortEssay,
}

impl ItemKind {
    /// Every known kind, in tag order.
    pub const ALL: [Self; 9] = [
        Self::SingleChoice,
        Self::MultipleChoice,
        Self::Cloze,
        Self::TrueOrFalse,
        Self::ReadingComprehension,
        Self::BlankFilling,
        Self::Translation,
        Self::Essay,
        Self::ShortEssay,
    ];

    /// Resolve a source type tag.
    pub const fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            1 => Some(Self::SingleChoice),
            2 => Some(Self::MultipleChoice),
            4 => Some(Self::Cloze),
            5 => Some(Self::TrueOrFalse),
            6 => Some(Self::ReadingComprehension),
            61 => Some(Self::BlankFilling),
            101 => Some(Self::Translation),
            102 => Some(Self::Essay),
            103 => Some(Self::ShortEssay),
            _ => None,
        }
    }

    pub const fn tag(self) -> i64 {
        match self {
            Self::SingleChoice => 1,
            Self::MultipleChoice => 2,
            Self::Cloze => 4,
            Self::TrueOrFalse => 5,
            Self::ReadingComprehension => 6,
            Self::BlankFilling => 61,
            Self::Translation => 101,
            Self::Essay => 102,
            Self::ShortEssay => 103,
        }
    }

    /// Human-readable label used as the artifact heading.
    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleChoice => "Single choice",
            Self::MultipleChoice => "Multiple choice",
            Self::Cloze => "Cloze",
            Self::TrueOrFalse => "True or false",
            Self::ReadingComprehension => "Reading comprehension",
            Self::BlankFilling => "Blank filling",
            Self::Translation => "Translation",
            Self::Essay => "Essay",
            Self::ShortEssay => "Short essay",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw content of one item as fetched from a source.
///
/// `id` and `type` are lifted out; every other field of the vendor payload is
/// kept verbatim in `body`. Once persisted a raw item is never rewritten
/// except by a forced re-fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub type_tag: i64,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl RawItem {
    pub fn new(id: impl Into<String>, type_tag: i64, body: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            type_tag,
            body,
        }
    }

    pub fn kind(&self) -> Option<ItemKind> {
        ItemKind::from_tag(self.type_tag)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// A string field, treating blank strings as absent.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.body
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Merge augmenting fields into the body, overwriting existing keys.
    ///
    /// `id` and `type` are reserved and never taken from the augment.
    pub fn augment(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            if key == "id" || key == "type" {
                continue;
            }
            self.body.insert(key, value);
        }
    }
}

/// An item returned by a source together with its auxiliary material
/// (answers, explanations, shared passages) fetched separately.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedItem {
    pub item: RawItem,
    pub auxiliary: Map<String, Value>,
}

impl FetchedItem {
    pub fn new(item: RawItem) -> Self {
        Self {
            item,
            auxiliary: Map::new(),
        }
    }

    #[must_use]
    pub fn with_auxiliary(mut self, key: impl Into<String>, value: Value) -> Self {
        self.auxiliary.insert(key.into(), value);
        self
    }

    /// The raw item with its auxiliary material merged in.
    pub fn into_raw_item(self) -> RawItem {
        let mut item = self.item;
        item.augment(self.auxiliary);
        item
    }
}

/// Rendered output of one raw item for one render target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub text: String,
    /// Placeholder token → asset value, in order of first appearance.
    #[serde(default)]
    pub assets: IndexMap<String, String>,
}

impl Artifact {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            assets: IndexMap::new(),
        }
    }
}

/// A batch of item ids leased from a source, persisted before processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointBatch {
    pub batch_id: String,
    pub item_ids: Vec<String>,
    /// Synthetic batches replay already-cached items on a forced re-fetch and
    /// are never acknowledged with or closed at the source.
    #[serde(default)]
    pub synthetic: bool,
}

impl CheckpointBatch {
    pub const fn leased(batch_id: String, item_ids: Vec<String>) -> Self {
        Self {
            batch_id,
            item_ids,
            synthetic: false,
        }
    }

    pub fn synthetic(index: usize, item_ids: Vec<String>) -> Self {
        Self {
            batch_id: format!("_{index}"),
            item_ids,
            synthetic: true,
        }
    }
}

/// Order item ids numerically; non-numeric ids follow, compared lexically.
pub fn compare_item_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u128>(), b.parse::<u128>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

pub fn sort_item_ids(ids: &mut [String]) {
    ids.sort_by(|a, b| compare_item_ids(a, b));
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

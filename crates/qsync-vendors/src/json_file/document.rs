//! The parsed and indexed JSON document.

use std::collections::{HashMap, HashSet};

use qsync_core::{AGGREGATE_ID, Bank, Category, RawItem};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::error::{JsonFileError, JsonFileResult};

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    banks: Vec<BankEntry>,
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    answers: Vec<AuxEntry>,
    #[serde(default)]
    explains: Vec<AuxEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct BankEntry {
    #[serde(deserialize_with = "id_string")]
    id: String,
    name: String,
    #[serde(default)]
    categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryEntry {
    #[serde(deserialize_with = "id_string")]
    id: String,
    name: String,
    #[serde(default)]
    children: Vec<Self>,
}

#[derive(Debug, Deserialize)]
struct AuxEntry {
    #[serde(deserialize_with = "id_string")]
    id: String,
    content: Value,
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, found {other}"
        ))),
    }
}

/// One item of the document with its placement.
#[derive(Debug, Clone)]
pub(crate) struct StoredItem {
    pub id: String,
    pub bank: Option<String>,
    pub category: String,
    pub raw: RawItem,
}

/// The document, indexed for lookups by id.
#[derive(Debug)]
pub(crate) struct Document {
    banks: Vec<BankEntry>,
    items: Vec<StoredItem>,
    by_id: HashMap<String, usize>,
    answers: HashMap<String, Value>,
    explains: HashMap<String, Value>,
}

impl Document {
    pub fn parse(json: &str) -> JsonFileResult<Self> {
        let raw: RawDocument =
            serde_json::from_str(json).map_err(|e| JsonFileError::Parse(e.to_string()))?;

        let mut items = Vec::with_capacity(raw.items.len());
        let mut by_id = HashMap::with_capacity(raw.items.len());
        for value in raw.items {
            let category = value
                .get("category")
                .and_then(value_id)
                .ok_or_else(|| JsonFileError::Parse("item without a category".to_string()))?;
            let bank = value.get("bank").and_then(value_id);
            let raw: RawItem = serde_json::from_value(value)
                .map_err(|e| JsonFileError::Parse(format!("item: {e}")))?;

            if by_id.insert(raw.id.clone(), items.len()).is_some() {
                return Err(JsonFileError::Parse(format!("duplicate item id {}", raw.id)));
            }
            items.push(StoredItem {
                id: raw.id.clone(),
                bank,
                category,
                raw,
            });
        }

        Ok(Self {
            banks: raw.banks,
            items,
            by_id,
            answers: raw.answers.into_iter().map(|a| (a.id, a.content)).collect(),
            explains: raw.explains.into_iter().map(|e| (e.id, e.content)).collect(),
        })
    }

    pub fn banks(&self) -> Vec<Bank> {
        self.banks
            .iter()
            .enumerate()
            .map(|(order, bank)| Bank {
                id: bank.id.clone(),
                key: bank.id.clone(),
                name: bank.name.clone(),
                count: self.items_of_bank(bank).count() as u64,
                order: order as i64,
            })
            .collect()
    }

    pub fn categories(&self, bank_id: &str) -> JsonFileResult<Vec<Category>> {
        let bank = self.bank(bank_id)?;
        Ok(bank
            .categories
            .iter()
            .enumerate()
            .map(|(order, entry)| self.category(bank, entry, order))
            .collect())
    }

    /// Number of items under `category_id` (the aggregate id covers the bank).
    pub fn count(&self, bank_id: &str, category_id: &str) -> JsonFileResult<u64> {
        Ok(self.items_under(bank_id, category_id)?.len() as u64)
    }

    /// Items placed in `category_id` or any of its descendants, in document order.
    pub fn items_under(&self, bank_id: &str, category_id: &str) -> JsonFileResult<Vec<&StoredItem>> {
        let bank = self.bank(bank_id)?;
        if category_id == AGGREGATE_ID {
            return Ok(self.items_of_bank(bank).collect());
        }

        let entry = find_category(&bank.categories, category_id).ok_or_else(|| {
            JsonFileError::UnknownCategory {
                bank: bank_id.to_string(),
                category: category_id.to_string(),
            }
        })?;
        let mut ids = HashSet::new();
        collect_ids(entry, &mut ids);
        Ok(self
            .items_of_bank(bank)
            .filter(|item| ids.contains(item.category.as_str()))
            .collect())
    }

    pub fn item(&self, id: &str) -> Option<&StoredItem> {
        self.by_id.get(id).map(|&index| &self.items[index])
    }

    pub fn answer(&self, id: &str) -> Option<&Value> {
        self.answers.get(id)
    }

    pub fn explain(&self, id: &str) -> Option<&Value> {
        self.explains.get(id)
    }

    fn bank(&self, bank_id: &str) -> JsonFileResult<&BankEntry> {
        self.banks
            .iter()
            .find(|bank| bank.id == bank_id)
            .ok_or_else(|| JsonFileError::UnknownBank(bank_id.to_string()))
    }

    fn items_of_bank<'a>(&'a self, bank: &'a BankEntry) -> impl Iterator<Item = &'a StoredItem> {
        let mut ids = HashSet::new();
        for entry in &bank.categories {
            collect_ids(entry, &mut ids);
        }
        self.items.iter().filter(move |item| match &item.bank {
            Some(owner) => owner == &bank.id,
            None => ids.contains(item.category.as_str()),
        })
    }

    fn category(&self, bank: &BankEntry, entry: &CategoryEntry, order: usize) -> Category {
        let mut ids = HashSet::new();
        collect_ids(entry, &mut ids);
        Category {
            id: entry.id.clone(),
            name: entry.name.clone(),
            count: self
                .items_of_bank(bank)
                .filter(|item| ids.contains(item.category.as_str()))
                .count() as u64,
            order: order as i64,
            children: entry
                .children
                .iter()
                .enumerate()
                .map(|(order, child)| self.category(bank, child, order))
                .collect(),
            fetched: false,
        }
    }
}

fn value_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn find_category<'a>(entries: &'a [CategoryEntry], id: &str) -> Option<&'a CategoryEntry> {
    entries.iter().find_map(|entry| {
        if entry.id == id {
            Some(entry)
        } else {
            find_category(&entry.children, id)
        }
    })
}

fn collect_ids<'a>(entry: &'a CategoryEntry, ids: &mut HashSet<&'a str>) {
    ids.insert(entry.id.as_str());
    for child in &entry.children {
        collect_ids(child, ids);
    }
}

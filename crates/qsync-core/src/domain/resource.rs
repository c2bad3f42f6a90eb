//! Hierarchical resource nodes: banks, categories and sheets.

use serde::{Deserialize, Serialize};

/// Id of the synthetic aggregate node injected at every listing level.
pub const AGGREGATE_ID: &str = "*";

/// Display name of the synthetic aggregate node.
pub const AGGREGATE_NAME: &str = "ALL";

/// Sort hint of the synthetic aggregate node; always sorts first.
pub const AGGREGATE_ORDER: i64 = -999;

/// Id of the placeholder returned for an empty listing.
pub const PLACEHOLDER_ID: &str = "0";

/// Display name of the placeholder returned for an empty listing.
pub const PLACEHOLDER_NAME: &str = "none";

/// Common shape of every listable resource.
///
/// The lister only needs identity, count and ordering, plus access to the
/// children of tree-shaped resources.
pub trait ResourceNode: Clone {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn count(&self) -> u64;
    fn order(&self) -> i64;
    fn set_order(&mut self, order: i64);
    fn set_name(&mut self, name: String);

    /// Build a node carrying only identity, count and order.
    fn synthetic(id: &str, name: &str, count: u64, order: i64) -> Self;

    /// Child nodes; empty for flat resources.
    fn children(&self) -> &[Self] {
        &[]
    }

    /// Replace the children. Flat resources ignore this.
    #[must_use]
    fn with_children(self, _children: Vec<Self>) -> Self {
        self
    }

    fn is_aggregate(&self) -> bool {
        self.id() == AGGREGATE_ID
    }
}

/// A question bank offered by a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub id: String,
    /// Opaque vendor-specific routing key.
    #[serde(default)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub order: i64,
}

/// A node of a bank's category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
    /// Whether every item under this category is already cached.
    ///
    /// Derived on read, never trusted from the vendor.
    #[serde(default)]
    pub fetched: bool,
}

impl Category {
    /// Find a node by id anywhere in the subtree rooted at `self`.
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Iterate over this node and all of its descendants, depth first.
    pub fn walk(&self) -> Vec<&Self> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }
}

/// A leaf grouping of items inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub order: i64,
}

impl ResourceNode for Bank {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn synthetic(id: &str, name: &str, count: u64, order: i64) -> Self {
        Self {
            id: id.to_string(),
            key: String::new(),
            name: name.to_string(),
            count,
            order,
        }
    }
}

impl ResourceNode for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn synthetic(id: &str, name: &str, count: u64, order: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            count,
            order,
            children: Vec::new(),
            fetched: false,
        }
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }
}

impl ResourceNode for Sheet {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn synthetic(id: &str, name: &str, count: u64, order: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            count,
            order,
        }
    }
}

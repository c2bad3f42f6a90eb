//! Normalization of hierarchical resource listings.
//!
//! Vendors return banks, categories and sheets in whatever order and shape
//! they like. Before anything is cached or shown, each level is normalized:
//!
//! 1. An empty level becomes a single `"0"`/`"none"` placeholder.
//! 2. Nodes are sorted by `(order, id, name)`.
//! 3. Unless excluded, a synthetic `"*"`/`"ALL"` aggregate is prepended and
//!    every real node's `order` becomes its index, shifted down by one.
//! 4. Optionally, names shared by several siblings get their id appended.
//!
//! Tree resources are normalized bottom-up: children before parents.

use std::collections::HashMap;

use crate::domain::{
    AGGREGATE_ID, AGGREGATE_NAME, AGGREGATE_ORDER, PLACEHOLDER_ID, PLACEHOLDER_NAME, ResourceNode,
};

/// Options controlling [`normalize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Do not inject the synthetic ALL node.
    pub exclude_aggregate: bool,
    /// Rewrite duplicated sibling names to `"<name> (<id>)"`.
    pub dedup_names: bool,
}

impl ListOptions {
    pub const fn new() -> Self {
        Self {
            exclude_aggregate: false,
            dedup_names: false,
        }
    }

    #[must_use]
    pub const fn without_aggregate(mut self) -> Self {
        self.exclude_aggregate = true;
        self
    }

    #[must_use]
    pub const fn with_dedup(mut self) -> Self {
        self.dedup_names = true;
        self
    }
}

/// Normalize one listing level and, recursively, every non-empty child level.
///
/// The input is never modified. Aggregate nodes already present in the input
/// (for example from a cached listing) are dropped and recomputed, so the
/// operation is idempotent.
pub fn normalize<T: ResourceNode>(items: &[T], opts: ListOptions) -> Vec<T> {
    let level = items
        .iter()
        .filter(|item| !item.is_aggregate())
        .map(|item| normalize_subtree(item, opts))
        .collect();
    normalize_level(level, opts)
}

fn normalize_subtree<T: ResourceNode>(item: &T, opts: ListOptions) -> T {
    if item.children().is_empty() {
        return item.clone();
    }
    let children = normalize(item.children(), opts);
    item.clone().with_children(children)
}

fn normalize_level<T: ResourceNode>(mut items: Vec<T>, opts: ListOptions) -> Vec<T> {
    if items.is_empty() {
        items.push(T::synthetic(PLACEHOLDER_ID, PLACEHOLDER_NAME, 0, 0));
    }

    sort_nodes(&mut items);

    let offset = if opts.exclude_aggregate {
        0
    } else {
        let total = items.iter().map(ResourceNode::count).sum();
        items.insert(
            0,
            T::synthetic(AGGREGATE_ID, AGGREGATE_NAME, total, AGGREGATE_ORDER),
        );
        1
    };

    for (index, item) in items.iter_mut().enumerate().skip(offset) {
        let order = i64::try_from(index - offset).unwrap_or(i64::MAX);
        item.set_order(order);
    }

    if opts.dedup_names {
        dedup_names(&mut items);
        sort_nodes(&mut items);
    }

    items
}

fn sort_nodes<T: ResourceNode>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.order()
            .cmp(&b.order())
            .then_with(|| a.id().cmp(b.id()))
            .then_with(|| a.name().cmp(b.name()))
    });
}

fn dedup_names<T: ResourceNode>(items: &mut [T]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for item in items.iter() {
        *seen.entry(item.name().to_string()).or_default() += 1;
    }

    for item in items.iter_mut() {
        if seen.get(item.name()).copied().unwrap_or(0) > 1 {
            let renamed = format!("{} ({})", item.name(), item.id());
            item.set_name(renamed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Sheet};

    fn sheet(id: &str, name: &str, count: u64, order: i64) -> Sheet {
        Sheet::synthetic(id, name, count, order)
    }

    fn category(id: &str, name: &str, count: u64, children: Vec<Category>) -> Category {
        Category::synthetic(id, name, count, 0).with_children(children)
    }

    #[test]
    fn test_empty_listing_yields_placeholder_and_aggregate() {
        let listed = normalize::<Sheet>(&[], ListOptions::new());
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, AGGREGATE_ID);
        assert_eq!(listed[0].count, 0);
        assert_eq!(listed[1].id, PLACEHOLDER_ID);
        assert_eq!(listed[1].name, PLACEHOLDER_NAME);
    }

    #[test]
    fn test_empty_listing_without_aggregate_is_only_placeholder() {
        let listed = normalize::<Sheet>(&[], ListOptions::new().without_aggregate());
        assert_eq!(listed, vec![sheet("0", "none", 0, 0)]);
    }

    #[test]
    fn test_aggregate_sums_counts_and_reindexes() {
        let input = vec![
            sheet("a", "A", 10, 3),
            sheet("b", "B", 5, 1),
            sheet("c", "C", 7, 2),
        ];
        let listed = normalize(&input, ListOptions::new());

        assert_eq!(listed[0].id, AGGREGATE_ID);
        assert_eq!(listed[0].name, AGGREGATE_NAME);
        assert_eq!(listed[0].count, 22);
        assert_eq!(listed[0].order, AGGREGATE_ORDER);

        let rest: Vec<_> = listed[1..]
            .iter()
            .map(|s| (s.id.as_str(), s.order))
            .collect();
        assert_eq!(rest, vec![("b", 0), ("c", 1), ("a", 2)]);
    }

    #[test]
    fn test_without_aggregate_orders_start_at_zero() {
        let input = vec![sheet("x", "X", 1, 50), sheet("y", "Y", 1, 10)];
        let listed = normalize(&input, ListOptions::new().without_aggregate());
        let orders: Vec<_> = listed.iter().map(|s| (s.id.as_str(), s.order)).collect();
        assert_eq!(orders, vec![("y", 0), ("x", 1)]);
    }

    #[test]
    fn test_ties_break_on_id_then_name() {
        let input = vec![sheet("2", "B", 0, 0), sheet("1", "Z", 0, 0), sheet("1", "A", 0, 0)];
        let listed = normalize(&input, ListOptions::new().without_aggregate());
        let names: Vec<_> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "Z", "B"]);
    }

    #[test]
    fn test_duplicate_names_get_ids_appended() {
        let input = vec![
            sheet("a", "Chapter 1", 1, 0),
            sheet("b", "Chapter 1", 1, 1),
            sheet("c", "Chapter 2", 1, 2),
        ];
        let listed = normalize(&input, ListOptions::new().with_dedup());
        let names: Vec<_> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ALL", "Chapter 1 (a)", "Chapter 1 (b)", "Chapter 2"]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = vec![sheet("b", "B", 1, 9), sheet("a", "A", 1, 8)];
        let snapshot = input.clone();
        let _ = normalize(&input, ListOptions::new().with_dedup());
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let input = vec![sheet("b", "B", 4, 9), sheet("a", "A", 1, 8)];
        let once = normalize(&input, ListOptions::new());
        let twice = normalize(&once, ListOptions::new());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tree_children_normalized_bottom_up() {
        let tree = vec![category(
            "1",
            "Root",
            3,
            vec![
                category("12", "Leaf", 2, vec![]),
                category("11", "Leaf", 1, vec![]),
            ],
        )];
        let listed = normalize(&tree, ListOptions::new().with_dedup());

        assert_eq!(listed[0].id, AGGREGATE_ID);
        assert_eq!(listed[0].count, 3);

        let root = &listed[1];
        assert_eq!(root.children[0].id, AGGREGATE_ID);
        assert_eq!(root.children[0].count, 3);
        let children: Vec<_> = root.children[1..]
            .iter()
            .map(|c| (c.name.as_str(), c.order))
            .collect();
        assert_eq!(children, vec![("Leaf (11)", 0), ("Leaf (12)", 1)]);
    }

    #[test]
    fn test_leaf_nodes_get_no_placeholder_children() {
        let tree = vec![category("1", "Only", 5, vec![])];
        let listed = normalize(&tree, ListOptions::new());
        assert!(listed[1].children.is_empty());
    }
}

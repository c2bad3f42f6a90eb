//! Matching command-line names against listed resources.

use qsync_core::{PLACEHOLDER_ID, PLACEHOLDER_NAME, ResourceNode};

use crate::error::CliError;

/// Find the node `query` names, searching nested children too.
///
/// An exact id or name wins; otherwise a case-insensitive name substring
/// must match exactly one node.
pub fn find<'a, T: ResourceNode>(
    kind: &str,
    nodes: &'a [T],
    query: &str,
) -> Result<&'a T, CliError> {
    let mut all = Vec::new();
    walk(nodes, &mut all);

    if let Some(node) = all.iter().copied().find(|node| node.id() == query) {
        return Ok(node);
    }
    if let Some(node) = all.iter().copied().find(|node| node.name() == query) {
        return Ok(node);
    }

    let needle = query.to_lowercase();
    let matches: Vec<&T> = all
        .into_iter()
        .filter(|node| !node.is_aggregate() && node.name().to_lowercase().contains(&needle))
        .collect();
    match matches.as_slice() {
        [node] => Ok(*node),
        [] => Err(CliError::Arguments(format!("No {kind} matches '{query}'"))),
        many => Err(CliError::Arguments(format!(
            "'{query}' is ambiguous between: {}",
            many.iter()
                .map(|node| format!("{} [{}]", node.name(), node.id()))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// The real nodes of a listing: no aggregate, no empty-listing placeholder.
pub fn concrete<T: ResourceNode>(nodes: &[T]) -> Vec<&T> {
    nodes
        .iter()
        .filter(|node| !node.is_aggregate() && !is_placeholder(*node))
        .collect()
}

pub fn is_placeholder<T: ResourceNode>(node: &T) -> bool {
    node.id() == PLACEHOLDER_ID && node.name() == PLACEHOLDER_NAME && node.count() == 0
}

fn walk<'a, T: ResourceNode>(nodes: &'a [T], out: &mut Vec<&'a T>) {
    for node in nodes {
        out.push(node);
        walk(node.children(), out);
    }
}

//! Flat search index over the navigation tree.

use serde::Serialize;

use crate::navigation::NavNode;

/// One searchable navigation node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl From<&NavNode> for SearchRecord {
    fn from(node: &NavNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            parent_id: node.parent_id.clone(),
        }
    }
}

/// Build the search index in preorder: a node, then its children in stored
/// order.
///
/// Uses an explicit stack, so tree depth does not grow the call stack.
#[must_use]
pub fn build_search_index(roots: &[NavNode]) -> Vec<SearchRecord> {
    let mut records = Vec::new();
    let mut stack: Vec<&NavNode> = roots.iter().rev().collect();

    while let Some(node) = stack.pop() {
        records.push(SearchRecord::from(node));
        if let Some(children) = &node.child_nodes {
            stack.extend(children.iter().rev());
        }
    }

    records
}

//! Navigation tree nodes and final tree assembly.
//!
//! Top-level nodes are containers. Each container holds the members resolved
//! to its id as `childNodes`. Members without an owner hang under a synthetic
//! `global` root appended after all containers.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::identity::{BaseIdentity, MEMBER_SEPARATOR};
use crate::record::EntityRecord;

/// Id, name and kind of the synthetic root for ownerless members.
pub const GLOBAL_ID: &str = "global";

/// Value of the `type` field on every navigation node.
pub const NAV_TYPE: &str = "api";

/// Navigation item with children for the API tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavNode {
    /// Persistent id (container id or member anchor).
    pub id: String,
    /// Id of the owning container. `None` for top-level containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Display name.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Sorted children; `None` when nothing resolved to this node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_nodes: Option<Vec<NavNode>>,
    /// Whether the node starts expanded.
    pub opened: bool,
    #[serde(rename = "type")]
    pub node_type: &'static str,
}

/// Fields needed to build a member navigation node.
#[derive(Clone, Copy, Debug)]
pub struct MemberSpec<'a> {
    pub name: &'a str,
    pub parent_id: &'a str,
    pub kind: &'a str,
    pub scope: Option<&'a str>,
}

impl NavNode {
    /// Top-level node for a container.
    #[must_use]
    pub fn container(identity: &BaseIdentity) -> Self {
        Self {
            id: identity.id.clone(),
            parent_id: None,
            name: identity.name.clone(),
            kind: Some(identity.kind.clone()),
            scope: None,
            child_nodes: None,
            opened: false,
            node_type: NAV_TYPE,
        }
    }

    /// Child node for a member of `spec.parent_id`.
    ///
    /// The id is an anchor within the parent page:
    /// `<parent>#<scope>-<kind>-<name>`, skipping absent parts. The factory
    /// suffixes repeats with `-<n>`.
    #[must_use]
    pub fn member(spec: MemberSpec<'_>) -> Self {
        let anchor = [spec.scope.unwrap_or(""), spec.kind, spec.name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        Self {
            id: format!("{}{MEMBER_SEPARATOR}{anchor}", spec.parent_id),
            parent_id: Some(spec.parent_id.to_owned()),
            name: spec.name.to_owned(),
            kind: (!spec.kind.is_empty()).then(|| spec.kind.to_owned()),
            scope: spec.scope.map(str::to_owned),
            child_nodes: None,
            opened: false,
            node_type: NAV_TYPE,
        }
    }

    /// Child nodes for the members nested directly on a container record.
    #[must_use]
    pub fn sub_items(record: &EntityRecord, parent: &BaseIdentity) -> Vec<Self> {
        record
            .members
            .iter()
            .map(|(scope, member)| {
                Self::member(MemberSpec {
                    name: &member.name,
                    parent_id: &parent.id,
                    kind: &member.kind,
                    scope: Some(member.scope.as_deref().unwrap_or(scope)),
                })
            })
            .collect()
    }

    /// The synthetic root hosting ownerless members.
    #[must_use]
    pub fn global_root() -> Self {
        Self {
            id: GLOBAL_ID.to_owned(),
            parent_id: Some(GLOBAL_ID.to_owned()),
            name: GLOBAL_ID.to_owned(),
            kind: Some(GLOBAL_ID.to_owned()),
            scope: None,
            child_nodes: None,
            opened: false,
            node_type: NAV_TYPE,
        }
    }
}

/// Total order used for sibling nodes.
pub trait SiblingOrder: Send + Sync {
    fn compare(&self, a: &NavNode, b: &NavNode) -> Ordering;

    /// Sort `nodes` in place. The sort is stable.
    fn order(&self, nodes: &mut [NavNode]) {
        nodes.sort_by(|a, b| self.compare(a, b));
    }
}

/// Default order: case-insensitive name, then name, then id.
#[derive(Clone, Copy, Debug, Default)]
pub struct NameOrder;

impl SiblingOrder for NameOrder {
    fn compare(&self, a: &NavNode, b: &NavNode) -> Ordering {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Attach sorted children to containers, sort the containers and append the
/// synthetic root when something resolved to it.
///
/// The synthetic root is exempt from sorting.
pub(crate) fn assemble(
    mut containers: Vec<NavNode>,
    nav_map: &HashMap<String, Vec<NavNode>>,
    with_global_root: bool,
    order: &dyn SiblingOrder,
) -> Vec<NavNode> {
    let sorted_children = |id: &str| {
        nav_map.get(id).map(|children| {
            let mut children = children.clone();
            order.order(&mut children);
            children
        })
    };

    for node in &mut containers {
        if let Some(children) = sorted_children(&node.id) {
            node.child_nodes = Some(children);
        }
    }

    order.order(&mut containers);

    if with_global_root {
        let mut root = NavNode::global_root();
        root.child_nodes = sorted_children(GLOBAL_ID);
        containers.push(root);
    }

    containers
}

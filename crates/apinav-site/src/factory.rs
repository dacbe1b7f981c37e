//! Turning an entity list into navigation, search and content data.
//!
//! # Pipeline
//!
//! One call to [`ApiDataFactory::create_data`] runs these passes over a fresh
//! [`BuildContext`]:
//! 1. Classify: containers get a nav node and a page; the rest is deferred
//! 2. Resolve: each deferred record is attached to a parent, or dropped
//! 3. Assemble: children sorted onto containers, containers sorted, global
//!    root appended
//! 4. Index: preorder search records
//! 5. Write: every page handed to the [`PageWriter`] in insertion order
//!
//! Nothing is kept between calls, so one factory can serve many threads.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::content::{ContentMap, ContentPage};
use crate::identity::{BaseIdentity, IdDeriver, PathIdDeriver, is_container_kind};
use crate::navigation::{self, GLOBAL_ID, MemberSpec, NameOrder, NavNode, SiblingOrder};
use crate::record::{EntityRecord, MemberRecord};
use crate::resolve::{ResolveEnv, resolve};
use crate::search::{SearchRecord, build_search_index};
use crate::writer::{PageWriteError, PageWriter};

/// Result of one build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiData {
    /// Sorted containers, then the global root if any.
    ///
    /// Ownerless typedefs and every other record without an owning container
    /// appear only as children of the global root.
    pub navigation: Vec<NavNode>,
    /// Every navigation node in preorder.
    pub search_keywords: Vec<SearchRecord>,
}

/// Builds [`ApiData`] from entity records.
///
/// Holds only the id and ordering collaborators; all per-run state lives in a
/// context created inside each call.
pub struct ApiDataFactory {
    deriver: Box<dyn IdDeriver>,
    order: Box<dyn SiblingOrder>,
}

impl Default for ApiDataFactory {
    fn default() -> Self {
        Self {
            deriver: Box::new(PathIdDeriver),
            order: Box::new(NameOrder),
        }
    }
}

impl ApiDataFactory {
    /// Factory with [`PathIdDeriver`] and [`NameOrder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the id deriver.
    #[must_use]
    pub fn with_id_deriver(mut self, deriver: impl IdDeriver + 'static) -> Self {
        self.deriver = Box::new(deriver);
        self
    }

    /// Replace the sibling order.
    #[must_use]
    pub fn with_sibling_order(mut self, order: impl SiblingOrder + 'static) -> Self {
        self.order = Box::new(order);
        self
    }

    /// Build navigation and search data, writing every content page.
    ///
    /// # Errors
    ///
    /// Returns the first [`PageWriteError`]; pages after it are not written.
    pub fn create_data(
        &self,
        records: &[EntityRecord],
        writer: &dyn PageWriter,
    ) -> Result<ApiData, PageWriteError> {
        let (data, pages) = self.build(records);

        for page in pages.iter() {
            writer.write_page(page)?;
        }

        Ok(data)
    }

    /// Build navigation and search data plus the content pages, without
    /// writing anything.
    #[must_use]
    pub fn build(&self, records: &[EntityRecord]) -> (ApiData, ContentMap) {
        let mut ctx = BuildContext::new(self.deriver.as_ref());
        ctx.classify(records);
        ctx.resolve_deferred();

        let (navigation, pages) = ctx.finish(self.order.as_ref());
        let search_keywords = build_search_index(&navigation);

        tracing::info!(
            records = records.len(),
            top_level = navigation.len(),
            searchable = search_keywords.len(),
            pages = pages.len(),
            "API data built"
        );

        (
            ApiData {
                navigation,
                search_keywords,
            },
            pages,
        )
    }
}

/// Accumulators for one build.
struct BuildContext<'a> {
    deriver: &'a dyn IdDeriver,
    containers: Vec<NavNode>,
    container_index: HashMap<String, usize>,
    nav_map: HashMap<String, Vec<NavNode>>,
    child_ids: HashSet<String>,
    pages: ContentMap,
    deferred: Vec<&'a EntityRecord>,
    emit_global_root: bool,
}

/// Whether a record owns a navigation node and a page of its own.
///
/// An ownerless typedef is hosted by the global root instead.
fn is_container(record: &EntityRecord) -> bool {
    is_container_kind(&record.kind) && !(record.kind == "typedef" && record.memberof.is_none())
}

impl<'a> BuildContext<'a> {
    fn new(deriver: &'a dyn IdDeriver) -> Self {
        Self {
            deriver,
            containers: Vec::new(),
            container_index: HashMap::new(),
            nav_map: HashMap::new(),
            child_ids: HashSet::new(),
            pages: ContentMap::new(),
            deferred: Vec::new(),
            emit_global_root: false,
        }
    }

    /// Register containers and queue everything else, in input order.
    fn classify(&mut self, records: &'a [EntityRecord]) {
        for record in records {
            if is_container(record) {
                self.add_container(record);
            } else {
                self.deferred.push(record);
            }
        }

        tracing::debug!(
            containers = self.containers.len(),
            deferred = self.deferred.len(),
            "Records classified"
        );
    }

    fn add_container(&mut self, record: &EntityRecord) {
        let identity = BaseIdentity::new(&record.name, &record.kind, self.deriver);

        if identity.id == GLOBAL_ID {
            tracing::warn!(
                name = %record.name,
                kind = %record.kind,
                "Container id is reserved for the global root, merging into it"
            );
            self.merge_into_global_root(record, &identity);
            return;
        }

        let node = NavNode::container(&identity);

        if let Some(&idx) = self.container_index.get(&identity.id) {
            tracing::warn!(
                id = %identity.id,
                name = %record.name,
                "Duplicate container id, later record wins"
            );
            self.containers[idx] = node;
        } else {
            self.container_index
                .insert(identity.id.clone(), self.containers.len());
            self.containers.push(node);
        }

        for child in NavNode::sub_items(record, &identity) {
            self.push_child(&identity.id, child);
        }

        self.pages.insert(ContentPage::container(&identity, record));
    }

    /// Fold a container whose id collides with the synthetic root into it.
    ///
    /// Nested members become root children and global page items; the page
    /// keeps its fixed title.
    fn merge_into_global_root(&mut self, record: &EntityRecord, identity: &BaseIdentity) {
        for child in NavNode::sub_items(record, identity) {
            self.push_child(GLOBAL_ID, child);
        }

        let page = self.pages.get_or_insert_with(GLOBAL_ID, ContentPage::global);
        page.items.extend(
            record
                .members
                .iter()
                .map(|(scope, member)| MemberRecord::from_nested(member, scope)),
        );
        page.details.extend(record.details.clone());

        self.emit_global_root = true;
    }

    /// Attach every deferred record to its parent, dropping the unresolved.
    fn resolve_deferred(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);

        for record in deferred {
            let env = ResolveEnv {
                deriver: self.deriver,
                pages: &self.pages,
            };
            let resolution = resolve(record, &env);
            let rule = resolution.rule();

            let Some(placement) = resolution.into_placement() else {
                tracing::debug!(
                    name = %record.name,
                    kind = %record.kind,
                    "Dropped unresolved record"
                );
                continue;
            };

            tracing::debug!(
                name = %record.name,
                parent = %placement.parent_id,
                rule,
                "Resolved member"
            );
            self.add_member(&placement.parent_id, placement.name, record);
        }
    }

    fn add_member(&mut self, parent_id: &str, name: &str, record: &EntityRecord) {
        let node = NavNode::member(MemberSpec {
            name,
            parent_id,
            kind: &record.kind,
            scope: record.scope.as_deref(),
        });
        self.push_child(parent_id, node);

        self.pages
            .get_or_insert_with(parent_id, || ContentPage::for_missing_parent(parent_id))
            .items
            .push(MemberRecord::from_record(record));

        if parent_id == GLOBAL_ID {
            self.emit_global_root = true;
        }
    }

    /// Register a child node under `parent_id`.
    ///
    /// A member id already handed out gets the first free `-<n>` suffix,
    /// starting at 2, so overloads stay addressable.
    fn push_child(&mut self, parent_id: &str, mut node: NavNode) {
        if !self.child_ids.insert(node.id.clone()) {
            let mut ordinal = 2;
            node.id = loop {
                let candidate = format!("{}-{ordinal}", node.id);
                if self.child_ids.insert(candidate.clone()) {
                    break candidate;
                }
                ordinal += 1;
            };
            tracing::debug!(id = %node.id, "Member id already taken, added ordinal");
        }

        self.nav_map
            .entry(parent_id.to_owned())
            .or_default()
            .push(node);
    }

    fn finish(self, order: &dyn SiblingOrder) -> (Vec<NavNode>, ContentMap) {
        let navigation = navigation::assemble(
            self.containers,
            &self.nav_map,
            self.emit_global_root,
            order,
        );
        (navigation, self.pages)
    }
}

//! Content pages keyed by container id.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::identity::BaseIdentity;
use crate::navigation::GLOBAL_ID;
use crate::record::{EntityRecord, MemberRecord};

/// Title of the synthetic global page.
pub const GLOBAL_TITLE: &str = "Global";

/// Content of one API page.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPage {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Members rendered on this page, in resolution order.
    pub items: Vec<MemberRecord>,
    /// Extractor fields of the container record.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl ContentPage {
    /// Page for a container record, pre-filled with its nested members.
    #[must_use]
    pub fn container(identity: &BaseIdentity, record: &EntityRecord) -> Self {
        Self {
            id: identity.id.clone(),
            kind: Some(identity.kind.clone()),
            title: Some(identity.name.clone()),
            parent_id: Some(identity.id.clone()),
            items: record
                .members
                .iter()
                .map(|(scope, member)| MemberRecord::from_nested(member, scope))
                .collect(),
            details: record.details.clone(),
        }
    }

    /// Page created on demand for a parent id no container declared.
    #[must_use]
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            kind: None,
            title: None,
            parent_id: None,
            items: Vec::new(),
            details: Map::new(),
        }
    }

    /// The synthetic global page.
    #[must_use]
    pub fn global() -> Self {
        Self {
            id: GLOBAL_ID.to_owned(),
            kind: None,
            title: Some(GLOBAL_TITLE.to_owned()),
            parent_id: Some(GLOBAL_ID.to_owned()),
            items: Vec::new(),
            details: Map::new(),
        }
    }

    /// Page to create when a member resolves to `id` and no page exists yet.
    #[must_use]
    pub(crate) fn for_missing_parent(id: &str) -> Self {
        if id == GLOBAL_ID {
            Self::global()
        } else {
            Self::placeholder(id)
        }
    }
}

/// Content pages keyed by id, iterated in insertion order.
#[derive(Debug, Default)]
pub struct ContentMap {
    pages: Vec<ContentPage>,
    index: HashMap<String, usize>,
}

impl ContentMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a page, replacing any page with the same id in place.
    ///
    /// Returns the replaced page.
    pub fn insert(&mut self, page: ContentPage) -> Option<ContentPage> {
        if let Some(&idx) = self.index.get(&page.id) {
            return Some(std::mem::replace(&mut self.pages[idx], page));
        }

        self.index.insert(page.id.clone(), self.pages.len());
        self.pages.push(page);
        None
    }

    /// Get the page for `id`, creating it with `create` if absent.
    pub fn get_or_insert_with(
        &mut self,
        id: &str,
        create: impl FnOnce() -> ContentPage,
    ) -> &mut ContentPage {
        let idx = if let Some(&idx) = self.index.get(id) {
            idx
        } else {
            let idx = self.pages.len();
            self.pages.push(create());
            self.index.insert(id.to_owned(), idx);
            idx
        };
        &mut self.pages[idx]
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ContentPage> {
        self.index.get(id).map(|&idx| &self.pages[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentPage> {
        self.pages.iter()
    }

    /// Consume the map, returning pages in insertion order.
    #[must_use]
    pub fn into_pages(self) -> Vec<ContentPage> {
        self.pages
    }
}

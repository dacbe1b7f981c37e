//! Input entity records and their content-page view.
//!
//! [`EntityRecord`] mirrors one entry of documentation.js JSON output. Only
//! the fields needed for classification are typed; everything else is kept
//! verbatim in `details` and flows through to [`MemberRecord`] and
//! [`ContentPage`](crate::ContentPage).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One documentation entity as produced by the extractor.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct EntityRecord {
    /// Entity name, possibly carrying `module:`/`external:` markers, quotes
    /// or a `#member` suffix.
    #[serde(default)]
    pub name: String,
    /// Entity kind (`class`, `module`, `function`, `event`, ...).
    #[serde(default)]
    pub kind: String,
    /// Name of the owning entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memberof: Option<String>,
    /// Scope qualifier (`static`, `instance`, `inner`, `global`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Members nested directly on this entity.
    #[serde(default, skip_serializing_if = "MemberGroups::is_empty")]
    pub members: MemberGroups,
    /// All other extractor fields, passed through untouched.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl EntityRecord {
    /// Create a record with a name and kind and no other fields.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Set the owning entity name.
    #[must_use]
    pub fn with_memberof(mut self, memberof: impl Into<String>) -> Self {
        self.memberof = Some(memberof.into());
        self
    }

    /// Set the scope qualifier.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Nested member lists, grouped the way documentation.js groups them.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MemberGroups {
    pub global: Vec<EntityRecord>,
    pub inner: Vec<EntityRecord>,
    pub instance: Vec<EntityRecord>,
    pub events: Vec<EntityRecord>,
    #[serde(rename = "static")]
    pub static_members: Vec<EntityRecord>,
}

impl MemberGroups {
    /// True if no group has any member.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
            && self.inner.is_empty()
            && self.instance.is_empty()
            && self.events.is_empty()
            && self.static_members.is_empty()
    }

    /// Iterate members with the scope implied by their group.
    ///
    /// Order: static, instance, events, inner, global. Events are instance
    /// scoped.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &EntityRecord)> {
        tagged("static", &self.static_members)
            .chain(tagged("instance", &self.instance))
            .chain(tagged("instance", &self.events))
            .chain(tagged("inner", &self.inner))
            .chain(tagged("global", &self.global))
    }
}

fn tagged<'a>(
    scope: &'static str,
    members: &'a [EntityRecord],
) -> impl Iterator<Item = (&'static str, &'a EntityRecord)> {
    members.iter().map(move |member| (scope, member))
}

/// A member entry rendered inside a content page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemberRecord {
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memberof: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl MemberRecord {
    /// Build the content view of a record.
    #[must_use]
    pub fn from_record(record: &EntityRecord) -> Self {
        Self {
            name: record.name.clone(),
            kind: record.kind.clone(),
            scope: record.scope.clone(),
            memberof: record.memberof.clone(),
            details: record.details.clone(),
        }
    }

    /// Same as [`from_record`](Self::from_record), but falls back to
    /// `scope` when the record carries none.
    #[must_use]
    pub(crate) fn from_nested(record: &EntityRecord, scope: &str) -> Self {
        let mut member = Self::from_record(record);
        member.scope.get_or_insert_with(|| scope.to_owned());
        member
    }
}

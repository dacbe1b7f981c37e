//! Container identity: display names and persistent ids.
//!
//! Container ids and module-member parent ids both go through
//! [`BaseIdentity::new`], so a member declared `memberof: "module:a/b"` always
//! lands under the container built from `name: "module:a/b"`.

/// Marker prefixed to module names (`module:foo`).
pub const MODULE_MARKER: &str = "module:";

/// Marker prefixed to external entity names (`external:Foo#bar`).
pub const EXTERNAL_MARKER: &str = "external:";

/// Separator between an owner and a member name (`Owner#member`).
pub const MEMBER_SEPARATOR: char = '#';

/// Kinds that own a navigable page.
pub const CONTAINER_KINDS: [&str; 7] = [
    "module",
    "external",
    "class",
    "namespace",
    "mixin",
    "global",
    "typedef",
];

/// Check whether `kind` owns a page.
#[must_use]
pub fn is_container_kind(kind: &str) -> bool {
    CONTAINER_KINDS.contains(&kind)
}

/// Derives a persistent id from a display name.
///
/// Implementations must be deterministic and must not map two distinct
/// display names of one batch onto the same id.
pub trait IdDeriver: Send + Sync {
    fn derive_id(&self, name: &str) -> String;
}

/// Default deriver: path separators become underscores (`a/b` -> `a_b`).
#[derive(Clone, Copy, Debug, Default)]
pub struct PathIdDeriver;

impl IdDeriver for PathIdDeriver {
    fn derive_id(&self, name: &str) -> String {
        name.replace('/', "_")
    }
}

/// Canonical identity of a container entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseIdentity {
    /// Persistent id.
    pub id: String,
    /// Entity kind.
    pub kind: String,
    /// Display name with quotes and module marker removed.
    pub name: String,
}

impl BaseIdentity {
    /// Build the identity of a container from its raw name and kind.
    #[must_use]
    pub fn new(name: &str, kind: &str, deriver: &dyn IdDeriver) -> Self {
        let name = display_name(name, kind);
        Self {
            id: deriver.derive_id(&name),
            kind: kind.to_owned(),
            name,
        }
    }

    /// Parent id for a member whose `memberof` names a module.
    ///
    /// Returns `None` when `memberof` carries no module marker.
    #[must_use]
    pub fn module_parent_id(memberof: &str, deriver: &dyn IdDeriver) -> Option<String> {
        memberof
            .contains(MODULE_MARKER)
            .then(|| Self::new(memberof, "module", deriver).id)
    }
}

/// Display name for an entity: quotes stripped, and for modules everything
/// up to and including the module marker removed.
#[must_use]
pub fn display_name(name: &str, kind: &str) -> String {
    let name = name.replace('"', "");
    if kind != "module" {
        return name;
    }

    match name.rsplit_once(MODULE_MARKER) {
        Some((_, rest)) => rest.to_owned(),
        None => name,
    }
}

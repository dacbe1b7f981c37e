//! Parent resolution for non-container records.
//!
//! A deferred record is matched against an ordered rule table; the
//! first rule that applies decides its parent id and display name. Records no
//! rule accepts resolve to [`Resolution::Unresolved`] and are dropped by the
//! caller.

use crate::content::ContentMap;
use crate::identity::{BaseIdentity, EXTERNAL_MARKER, IdDeriver, MEMBER_SEPARATOR};
use crate::navigation::GLOBAL_ID;
use crate::record::EntityRecord;

/// Where a member goes and the name it is shown under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement<'a> {
    pub parent_id: String,
    pub name: &'a str,
}

/// Outcome of resolving one deferred record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// `memberof` names a module (`module:ui/grid`).
    ModuleMember(Placement<'a>),
    /// `name` is `external:Owner#member`.
    ExternalMember(Placement<'a>),
    /// An event named `Owner#event`.
    EventMember(Placement<'a>),
    /// A typedef without an owner; goes under the global root.
    OrphanTypedef(Placement<'a>),
    /// `memberof` equals the id of an existing page.
    ImplicitMember(Placement<'a>),
    Unresolved,
}

impl<'a> Resolution<'a> {
    /// The placement, unless unresolved.
    #[must_use]
    pub fn into_placement(self) -> Option<Placement<'a>> {
        match self {
            Self::ModuleMember(p)
            | Self::ExternalMember(p)
            | Self::EventMember(p)
            | Self::OrphanTypedef(p)
            | Self::ImplicitMember(p) => Some(p),
            Self::Unresolved => None,
        }
    }

    /// Short rule name, used in logs.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        match self {
            Self::ModuleMember(_) => "module-member",
            Self::ExternalMember(_) => "external-member",
            Self::EventMember(_) => "event-member",
            Self::OrphanTypedef(_) => "orphan-typedef",
            Self::ImplicitMember(_) => "implicit-member",
            Self::Unresolved => "unresolved",
        }
    }
}

/// What the rules may consult besides the record itself.
#[derive(Clone, Copy)]
pub struct ResolveEnv<'e> {
    pub deriver: &'e dyn IdDeriver,
    /// Pages known at the time the record is resolved.
    pub pages: &'e ContentMap,
}

type Rule = for<'r, 'e> fn(&'r EntityRecord, &ResolveEnv<'e>) -> Option<Resolution<'r>>;

/// Resolution rules, highest priority first.
const RULES: [Rule; 5] = [
    module_member,
    external_member,
    event_member,
    orphan_typedef,
    implicit_member,
];

/// Resolve a deferred record against the rule table.
#[must_use]
pub fn resolve<'r>(record: &'r EntityRecord, env: &ResolveEnv<'_>) -> Resolution<'r> {
    RULES
        .iter()
        .find_map(|rule| rule(record, env))
        .unwrap_or(Resolution::Unresolved)
}

fn module_member<'r>(record: &'r EntityRecord, env: &ResolveEnv<'_>) -> Option<Resolution<'r>> {
    let memberof = record.memberof.as_deref()?;
    let parent_id = BaseIdentity::module_parent_id(memberof, env.deriver)?;

    Some(Resolution::ModuleMember(Placement {
        parent_id,
        name: &record.name,
    }))
}

fn external_member<'r>(record: &'r EntityRecord, env: &ResolveEnv<'_>) -> Option<Resolution<'r>> {
    let (_, external) = record.name.rsplit_once(EXTERNAL_MARKER)?;
    let (owner, name) = external.split_once(MEMBER_SEPARATOR)?;

    Some(Resolution::ExternalMember(Placement {
        parent_id: env.deriver.derive_id(owner),
        name,
    }))
}

fn event_member<'r>(record: &'r EntityRecord, env: &ResolveEnv<'_>) -> Option<Resolution<'r>> {
    if record.kind != "event" {
        return None;
    }
    let (owner, name) = record.name.split_once(MEMBER_SEPARATOR)?;

    Some(Resolution::EventMember(Placement {
        parent_id: env.deriver.derive_id(owner),
        name,
    }))
}

fn orphan_typedef<'r>(record: &'r EntityRecord, _env: &ResolveEnv<'_>) -> Option<Resolution<'r>> {
    (record.kind == "typedef").then(|| {
        Resolution::OrphanTypedef(Placement {
            parent_id: GLOBAL_ID.to_owned(),
            name: &record.name,
        })
    })
}

fn implicit_member<'r>(record: &'r EntityRecord, env: &ResolveEnv<'_>) -> Option<Resolution<'r>> {
    let memberof = record.memberof.as_deref()?;
    env.pages.contains(memberof).then(|| {
        Resolution::ImplicitMember(Placement {
            parent_id: memberof.to_owned(),
            name: &record.name,
        })
    })
}

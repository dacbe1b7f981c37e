//! API navigation and search data for apinav.
//!
//! This crate turns the flat entity list emitted by a documentation extractor
//! (documentation.js JSON) into:
//! - [`NavNode`] trees for the site navigation
//! - [`ContentPage`]s, one per container, handed to a [`PageWriter`]
//! - [`SearchRecord`]s, a flat preorder index of every navigation node
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use apinav_site::{ApiDataFactory, EntityRecord, MemoryPageWriter};
//!
//! let records: Vec<EntityRecord> = serde_json::from_str(
//!     r#"[{"name": "Widget", "kind": "class"}]"#,
//! )?;
//! let writer = MemoryPageWriter::new();
//! let data = ApiDataFactory::new().create_data(&records, &writer)?;
//!
//! assert_eq!(data.navigation[0].name, "Widget");
//! assert_eq!(writer.pages().len(), 1);
//! # Ok(())
//! # }
//! ```

mod content;
mod factory;
mod identity;
mod navigation;
mod record;
mod resolve;
mod search;
mod writer;

pub use content::{ContentMap, ContentPage, GLOBAL_TITLE};
pub use factory::{ApiData, ApiDataFactory};
pub use identity::{
    BaseIdentity, CONTAINER_KINDS, EXTERNAL_MARKER, IdDeriver, MEMBER_SEPARATOR, MODULE_MARKER,
    PathIdDeriver, display_name, is_container_kind,
};
pub use navigation::{GLOBAL_ID, MemberSpec, NAV_TYPE, NameOrder, NavNode, SiblingOrder};
pub use record::{EntityRecord, MemberGroups, MemberRecord};
pub use resolve::{Placement, ResolveEnv, Resolution, resolve};
pub use search::{SearchRecord, build_search_index};
pub use writer::{MemoryPageWriter, PageWriteError, PageWriteErrorKind, PageWriter};

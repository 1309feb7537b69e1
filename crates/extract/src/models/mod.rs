//! Typed records decoded from upstream payloads.

mod brief;
mod collection;
mod index;
mod page;

pub use self::brief::BriefMetadata;
pub use self::collection::CollectionMetadata;
pub use self::index::IndexFields;
pub use self::page::{CloneSource, PageRecord};

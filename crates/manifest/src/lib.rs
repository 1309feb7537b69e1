//! The manifest record and how it is assembled.
//!
//! Source payloads are merged into a [`Draft`] by fixed precedence rules,
//! raw page records become a [`PageList`] with [`build`], and the frozen
//! [`ManifestRecord`] is bound into the manifest template by a [`Renderer`].

pub mod error;
mod kind;
mod pages;
mod reconcile;
mod record;
mod render;

pub use crate::kind::{AuthorSource, RecordKind};
pub use crate::pages::{ExemplarRule, PageList, build};
pub use crate::reconcile::Draft;
pub use crate::record::{ManifestRecord, MasterFile, Metadata, MetadataEntry, Rotation};
pub use crate::render::Renderer;

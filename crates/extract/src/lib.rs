//! Typed decoders for the payloads returned by upstream metadata sources.
//!
//! Every document shape gets exactly one extractor: JSON payloads decode into
//! the structs in [`models`], and XML fragments (MODS, MARC and search index
//! documents) are read with a small element tree built on `quick-xml`.
//! Extractors return optional fields; deciding which source wins is left to
//! the caller. [`sanitize`] prepares text for embedding in a JSON template.

pub mod error;
pub mod models;
mod text;
mod xml;

pub use crate::models::{BriefMetadata, CloneSource, CollectionMetadata, IndexFields, PageRecord};
pub use crate::text::sanitize;
pub use crate::xml::{Descriptive, physical_description};

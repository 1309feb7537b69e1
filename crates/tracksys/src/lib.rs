//! Read-only access to the TrackSys relational record store.
//!
//! TrackSys owns the schema; iiifman only ever runs parameterized `SELECT`s
//! against it. Connections go through sqlx's `Any` driver so the same
//! queries run against MySQL in production and SQLite in tests.
//!
//! # Entities
//! - **Metadata**: a descriptive record (catalog, XML or external) whose
//!   pages are the master files of its units.
//! - **Components**: archival components (folders, items) whose pages are
//!   linked directly to the component.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::{ComponentRecord, MetadataRecord, PageFilter, Table};
pub use crate::repo::Repository;

//! Queries against the record store.
//!
//! Metadata records and components are the two entities a PID can name.
//! Pages (master files) are never addressed directly; they are always
//! fetched through the record that owns them, ordered by filename.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{
    ComponentRecord, ComponentRow, CountRow, MetadataRecord, MetadataRow, PageFilter, PageRow, Table,
};
use exn::ResultExt;
use iiifman_extract::PageRecord;
use sqlx::AnyPool;
use tracing::instrument;

/// Repository for the read-only record store queries.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: AnyPool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    async fn count(&self, query: &'static str, pid: &str) -> Result<i64> {
        let row: CountRow = sqlx::query_as(query)
            .bind(pid)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(row.matches)
    }

    /// Find the table that holds the PID.
    ///
    /// Tables are checked in a fixed priority order (metadata, then
    /// components) and the first one with exactly one matching row wins.
    /// A PID matching several rows of a table is ambiguous and skipped.
    #[instrument(skip(self))]
    pub async fn classify(&self, pid: &str) -> Result<Option<Table>> {
        for (table, query) in [
            (Table::Metadata, include_str!("../queries/count_metadata.sql")),
            (Table::Component, include_str!("../queries/count_components.sql")),
        ] {
            let matches = self.count(query, pid).await?;
            if matches == 1 {
                return Ok(Some(table));
            }
            if matches > 1 {
                tracing::warn!(target: "iiifman::tracksys", pid, ?table, matches, "ambiguous PID");
            }
        }
        Ok(None)
    }

    /// Get a metadata record by PID.
    pub async fn metadata(&self, pid: &str) -> Result<Option<MetadataRecord>> {
        let row: Option<MetadataRow> = sqlx::query_as(include_str!("../queries/get_metadata.sql"))
            .bind(pid)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(row.map(MetadataRecord::from))
    }

    /// Get the pages of a metadata record, ordered by filename.
    #[instrument(skip(self))]
    pub async fn metadata_pages(&self, metadata_id: i64, filter: PageFilter) -> Result<Vec<PageRecord>> {
        let query = match filter {
            PageFilter::Unit(unit) => sqlx::query_as(include_str!("../queries/metadata_pages_unit.sql"))
                .bind(metadata_id)
                .bind(i64::from(unit)),
            PageFilter::All => sqlx::query_as(include_str!("../queries/metadata_pages_all.sql")).bind(metadata_id),
            PageFilter::DigitalLibrary => {
                sqlx::query_as(include_str!("../queries/metadata_pages_dl.sql")).bind(metadata_id)
            },
        };
        let rows: Vec<PageRow> = query.fetch_all(&self.pool).await.or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(PageRecord::try_from).collect()
    }

    /// Get a component by PID.
    pub async fn component(&self, pid: &str) -> Result<Option<ComponentRecord>> {
        let row: Option<ComponentRow> = sqlx::query_as(include_str!("../queries/get_component.sql"))
            .bind(pid)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(row.map(ComponentRecord::from))
    }

    /// Get the pages linked to a component, ordered by filename.
    ///
    /// Each page carries the MODS document of the metadata record it
    /// belongs to, if there is one.
    #[instrument(skip(self))]
    pub async fn component_pages(&self, component_id: i64) -> Result<Vec<PageRecord>> {
        let rows: Vec<PageRow> = sqlx::query_as(include_str!("../queries/component_pages.sql"))
            .bind(component_id)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(PageRecord::try_from).collect()
    }
}

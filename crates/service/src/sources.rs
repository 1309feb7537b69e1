//! The data sources a manifest is generated from.
//!
//! Generation only ever talks to these two traits, so that a deployment can
//! run with or without a relational store and tests can substitute fakes.

use async_trait::async_trait;
use iiifman_extract::{BriefMetadata, CollectionMetadata, IndexFields, PageRecord};
use iiifman_remote::Remote;
use iiifman_remote::error::Result as RemoteResult;
use iiifman_tracksys::error::Result as StoreResult;
use iiifman_tracksys::{ComponentRecord, MetadataRecord, PageFilter, Repository, Table};

/// Remote metadata services.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Record type reported by the tracking service, or `None` if it does
    /// not know the PID.
    async fn pid_type(&self, pid: &str) -> RemoteResult<Option<String>>;

    async fn brief_metadata(&self, pid: &str) -> RemoteResult<BriefMetadata>;

    async fn collection_metadata(&self, pid: &str) -> RemoteResult<CollectionMetadata>;

    /// Ordered page records of a record, limited to one unit when given.
    async fn page_list(&self, pid: &str, unit: Option<u32>) -> RemoteResult<Vec<PageRecord>>;

    /// Search index record held by the tracking service.
    async fn repository_index(&self, pid: &str) -> RemoteResult<IndexFields>;

    /// Catalog search index record, or `None` when no catalog index is configured.
    async fn catalog_index(&self, catalog_key: &str) -> RemoteResult<Option<IndexFields>>;

    /// PID a legacy identifier was migrated to in the collection system.
    async fn legacy_lookup(&self, pid: &str) -> RemoteResult<Option<String>>;
}

#[async_trait]
impl Upstream for Remote {
    async fn pid_type(&self, pid: &str) -> RemoteResult<Option<String>> {
        self.tracksys.pid_type(pid).await
    }

    async fn brief_metadata(&self, pid: &str) -> RemoteResult<BriefMetadata> {
        self.tracksys.brief_metadata(pid).await
    }

    async fn collection_metadata(&self, pid: &str) -> RemoteResult<CollectionMetadata> {
        self.apollo.items(pid).await
    }

    async fn page_list(&self, pid: &str, unit: Option<u32>) -> RemoteResult<Vec<PageRecord>> {
        self.tracksys.manifest(pid, unit).await
    }

    async fn repository_index(&self, pid: &str) -> RemoteResult<IndexFields> {
        self.tracksys.solr(pid).await
    }

    async fn catalog_index(&self, catalog_key: &str) -> RemoteResult<Option<IndexFields>> {
        match &self.virgo {
            Some(virgo) => virgo.select(catalog_key).await.map(Some),
            None => Ok(None),
        }
    }

    async fn legacy_lookup(&self, pid: &str) -> RemoteResult<Option<String>> {
        self.apollo.legacy_lookup(pid).await
    }
}

/// Read-only relational record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn classify(&self, pid: &str) -> StoreResult<Option<Table>>;

    async fn metadata(&self, pid: &str) -> StoreResult<Option<MetadataRecord>>;

    async fn metadata_pages(&self, metadata_id: i64, filter: PageFilter) -> StoreResult<Vec<PageRecord>>;

    async fn component(&self, pid: &str) -> StoreResult<Option<ComponentRecord>>;

    async fn component_pages(&self, component_id: i64) -> StoreResult<Vec<PageRecord>>;
}

#[async_trait]
impl RecordStore for Repository {
    async fn classify(&self, pid: &str) -> StoreResult<Option<Table>> {
        Repository::classify(self, pid).await
    }

    async fn metadata(&self, pid: &str) -> StoreResult<Option<MetadataRecord>> {
        Repository::metadata(self, pid).await
    }

    async fn metadata_pages(&self, metadata_id: i64, filter: PageFilter) -> StoreResult<Vec<PageRecord>> {
        Repository::metadata_pages(self, metadata_id, filter).await
    }

    async fn component(&self, pid: &str) -> StoreResult<Option<ComponentRecord>> {
        Repository::component(self, pid).await
    }

    async fn component_pages(&self, component_id: i64) -> StoreResult<Vec<PageRecord>> {
        Repository::component_pages(self, component_id).await
    }
}

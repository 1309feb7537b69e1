//! Apollo, the aggregator for externally curated collections.

use crate::client::{ApiClient, endpoint};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use iiifman_extract::CollectionMetadata;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct ApolloApi {
    base_url: String,
    client: ApiClient,
}

impl ApolloApi {
    pub fn new(base_url: impl Into<String>, client: ApiClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    /// Collection-level metadata for an item.
    #[instrument(skip(self))]
    pub async fn items(&self, pid: &str) -> Result<CollectionMetadata> {
        let url = endpoint(&self.base_url, &["api", "items", pid], &[])?;
        let body = self.client.get(url.as_str()).await?;
        CollectionMetadata::from_json(body).or_raise(|| ErrorKind::Malformed(url.into()))
    }

    /// Map a TrackSys PID onto the Apollo PID of the same item, if Apollo has one.
    #[instrument(skip(self))]
    pub async fn legacy_lookup(&self, pid: &str) -> Result<Option<String>> {
        let url = endpoint(&self.base_url, &["legacy", "lookup", pid], &[])?;
        match self.client.get(url.as_str()).await {
            Ok(body) => Ok(Some(body.trim().to_string()).filter(|apollo_pid| !apollo_pid.is_empty())),
            Err(err) if matches!(&*err, ErrorKind::Status { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

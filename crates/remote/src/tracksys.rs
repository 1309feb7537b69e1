//! TrackSys, the digitization tracking service.

use crate::client::{ApiClient, endpoint};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use iiifman_extract::{BriefMetadata, IndexFields, PageRecord};
use tracing::instrument;

/// Answer TrackSys gives for PIDs it does not know.
const INVALID_TYPE: &str = "invalid";

#[derive(Debug, Clone)]
pub struct TrackSysApi {
    base_url: String,
    client: ApiClient,
    /// Solr requests are slow; they get their own, longer, timeout.
    index_client: ApiClient,
}

impl TrackSysApi {
    pub fn new(base_url: impl Into<String>, client: ApiClient, index_client: ApiClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client, index_client }
    }

    /// Ask TrackSys what kind of record a PID names.
    ///
    /// Returns `None` when TrackSys answers with an error status or with
    /// `invalid`. Failing to reach TrackSys at all is an error.
    #[instrument(skip(self))]
    pub async fn pid_type(&self, pid: &str) -> Result<Option<String>> {
        let url = endpoint(&self.base_url, &["api", "pid", pid, "type"], &[])?;
        match self.client.get(url.as_str()).await {
            Ok(body) => {
                let kind = body.trim();
                Ok((!kind.is_empty() && kind != INVALID_TYPE).then(|| kind.to_string()))
            },
            Err(err) if matches!(&*err, ErrorKind::Status { .. }) => {
                tracing::debug!(target: "iiifman::remote", pid, error = %err, "tracksys does not know pid");
                Ok(None)
            },
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self))]
    pub async fn brief_metadata(&self, pid: &str) -> Result<BriefMetadata> {
        let url = endpoint(&self.base_url, &["api", "metadata", pid], &[("type", "brief")])?;
        let body = self.client.get(url.as_str()).await?;
        BriefMetadata::from_json(body).or_raise(|| ErrorKind::Malformed(url.into()))
    }

    /// Ordered page list, optionally restricted to one unit.
    #[instrument(skip(self))]
    pub async fn manifest(&self, pid: &str, unit: Option<u32>) -> Result<Vec<PageRecord>> {
        let unit = unit.map(|unit| unit.to_string());
        let query: Vec<_> = unit.iter().map(|unit| ("unit", unit.as_str())).collect();
        let url = endpoint(&self.base_url, &["api", "manifest", pid], &query)?;
        let body = self.client.get(url.as_str()).await?;
        PageRecord::list_from_json(body).or_raise(|| ErrorKind::Malformed(url.into()))
    }

    /// The repository's own Solr record for a PID.
    #[instrument(skip(self))]
    pub async fn solr(&self, pid: &str) -> Result<IndexFields> {
        let url = endpoint(&self.base_url, &["solr", pid], &[("no_external", "1")])?;
        let body = self.index_client.get(url.as_str()).await?;
        IndexFields::from_repository_record(&body).or_raise(|| ErrorKind::Malformed(url.into()))
    }
}

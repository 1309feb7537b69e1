//! HTTP adapters for the remote metadata services.
//!
//! Each adapter knows one upstream and returns typed payloads decoded by
//! `iiifman-extract`. Adapters never retry; a failed call is reported with an
//! [`ErrorKind`](crate::error::ErrorKind) that says whether the upstream was
//! unreachable or misbehaving.

mod apollo;
mod client;
pub mod error;
mod tracksys;
mod virgo;

pub use crate::apollo::ApolloApi;
pub use crate::client::ApiClient;
pub use crate::tracksys::TrackSysApi;
pub use crate::virgo::VirgoIndex;

use crate::error::Result;
use iiifman_config::Config;

/// Every remote adapter a deployment talks to.
#[derive(Debug, Clone)]
pub struct Remote {
    pub tracksys: TrackSysApi,
    pub apollo: ApolloApi,
    /// Catalog enrichment is skipped when no index is configured.
    pub virgo: Option<VirgoIndex>,
}

impl Remote {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ApiClient::new(&config.http, config.http.request_timeout())?;
        let index_client = ApiClient::new(&config.http, config.http.index_timeout())?;
        Ok(Self {
            tracksys: TrackSysApi::new(&config.tracksys_url, client.clone(), index_client.clone()),
            apollo: ApolloApi::new(&config.apollo_url, client),
            virgo: config.virgo_solr_url.as_ref().map(|url| VirgoIndex::new(url, index_client)),
        })
    }
}

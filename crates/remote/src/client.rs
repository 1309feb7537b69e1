use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use iiifman_config::HttpConfig;
use reqwest::{Client, StatusCode, Url};
use std::time::{Duration, Instant};
use tracing::instrument;

const USER_AGENT: &str = concat!("iiifman/", env!("CARGO_PKG_VERSION"));
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

/// Pooled HTTP client shared by every adapter talking to one kind of upstream.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(http: &HttpConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(http.connect_timeout())
            .timeout(timeout)
            .pool_max_idle_per_host(http.pool_max_idle_per_host)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { client })
    }

    /// `GET` a URL and return the body text.
    ///
    /// Only `200 OK` and `201 Created` count as success; any other status is
    /// an [`ErrorKind::Status`] carrying the upstream body.
    #[instrument(skip(self))]
    pub async fn get(&self, url: &str) -> Result<String> {
        let started = Instant::now();
        let result = self.fetch(url).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(body) => {
                tracing::info!(target: "iiifman::remote", url, elapsed_ms, size = body.len(), "upstream responded")
            },
            Err(err) => tracing::warn!(target: "iiifman::remote", url, elapsed_ms, error = %err, "upstream request failed"),
        }
        result
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                let kind = transport_error(url, &err);
                return Err(err).or_raise(|| kind);
            },
        };
        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            exn::bail!(ErrorKind::Status { url: url.to_string(), status: status.as_u16(), body: body.trim().to_string() });
        }
        response.text().await.or_raise(|| ErrorKind::Transport(url.to_string()))
    }
}

/// Append path segments and query pairs to a base URL, percent-encoding
/// each of them.
pub(crate) fn endpoint(base: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base).or_raise(|| ErrorKind::Transport(base.to_string()))?;
    match url.path_segments_mut() {
        Ok(mut path) => {
            path.pop_if_empty().extend(segments);
        },
        Err(()) => exn::bail!(ErrorKind::Transport(base.to_string())),
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

fn transport_error(url: &str, err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        ErrorKind::Timeout(url.to_string())
    } else if err.is_connect() {
        ErrorKind::Refused(url.to_string())
    } else {
        ErrorKind::Transport(url.to_string())
    }
}

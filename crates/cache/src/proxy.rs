use crate::MANIFEST_CONTENT_TYPE;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use iiifman_storage::BackendHandle;
use iiifman_storage::error::ErrorKind as StorageErrorKind;
use tracing::instrument;

/// Get/put wrapper around the object storage that holds rendered manifests.
///
/// A proxy without a backend is a valid, permanently empty cache: nothing is
/// ever found and nothing is ever written.
#[derive(Clone)]
pub struct CacheProxy {
    backend: Option<BackendHandle>,
    root_url: String,
    bucket: String,
}

impl CacheProxy {
    /// `root_url` and `bucket` form the public URL cached manifests are served from.
    pub fn new(backend: BackendHandle, root_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self { backend: Some(backend), root_url: root_url.into(), bucket: bucket.into() }
    }

    pub fn disabled() -> Self {
        Self { backend: None, root_url: String::new(), bucket: String::new() }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Public URL of a cached manifest.
    pub fn url(&self, key: &str) -> Option<String> {
        self.is_enabled().then(|| format!("{}/{}/{key}", self.root_url.trim_end_matches('/'), self.bucket))
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let Some(backend) = &self.backend else { return Ok(false) };
        let exists = backend.exists(key).await.or_raise(|| ErrorKind::Lookup(key.to_string()))?;
        tracing::debug!(target: "iiifman::cache", key, exists, "checked cache");
        Ok(exists)
    }

    /// Read a cached manifest, or `None` on a miss.
    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(backend) = &self.backend else { return Ok(None) };
        let data = match backend.read(key).await {
            Ok(data) => data,
            Err(err) if matches!(&*err, StorageErrorKind::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err).or_raise(|| ErrorKind::Read(key.to_string())),
        };
        let manifest = String::from_utf8(data).or_raise(|| ErrorKind::Corrupt(key.to_string()))?;
        tracing::info!(target: "iiifman::cache", key, size = manifest.len(), "served manifest from cache");
        Ok(Some(manifest))
    }

    /// Store a rendered manifest, replacing any previous version.
    #[instrument(skip(self, manifest), fields(size = manifest.len()))]
    pub async fn put(&self, key: &str, manifest: &str) -> Result<()> {
        let Some(backend) = &self.backend else { return Ok(()) };
        backend
            .write(key, manifest.as_bytes(), Some(MANIFEST_CONTENT_TYPE))
            .await
            .or_raise(|| ErrorKind::Write(key.to_string()))?;
        tracing::info!(target: "iiifman::cache", key, backend = backend.name(), "wrote manifest to cache");
        Ok(())
    }
}

impl std::fmt::Debug for CacheProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheProxy")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("root_url", &self.root_url)
            .field("bucket", &self.bucket)
            .finish()
    }
}

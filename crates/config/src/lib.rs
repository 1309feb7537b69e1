//! Configuration for the iiifman service.
//!
//! Settings are merged by `figment` from, lowest to highest priority:
//! built-in defaults, an optional YAML/TOML/JSON file, `IIIFMAN_*`
//! environment variables (nested keys split on `__`, e.g.
//! `IIIFMAN_CACHE__BUCKET`), then command-line overrides. The result is
//! validated once at startup and shared read-only (`Arc<Config>`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "IIIFMAN_";

/// Which system decides what kind of record a PID refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Query the relational record store directly.
    Local,
    /// Ask the TrackSys API.
    #[default]
    Remote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    S3,
    Local,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub bucket: String,
    /// Public root URL that cached manifests are served from.
    pub root_url: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services.
    pub endpoint: Option<String>,
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    /// Key prefix inside the bucket.
    pub prefix: Option<String>,
    /// Root directory for the `local` backend.
    pub directory: Option<PathBuf>,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            bucket: "iiif-manifest-cache-staging".to_string(),
            root_url: "https://s3.us-east-1.amazonaws.com".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            key_id: None,
            key_secret: None,
            prefix: None,
            directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Search index requests are slow; they get their own, longer timeout.
    pub index_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
}
impl Default for HttpConfig {
    fn default() -> Self {
        Self { connect_timeout_secs: 5, request_timeout_secs: 15, index_timeout_secs: 45, pool_max_idle_per_host: 50 }
    }
}
impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn index_timeout(&self) -> Duration {
        Duration::from_secs(self.index_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// Public base URL of this service.
    pub service_url: String,
    pub classifier: ClassifierMode,
    /// TrackSys base URL; its API lives under `/api`.
    pub tracksys_url: String,
    pub apollo_url: String,
    /// Library catalog Solr; enrichment for catalog records is skipped without it.
    pub virgo_solr_url: Option<String>,
    /// IIIF image server base URL.
    pub iiif_url: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Path to the manifest template.
    pub template: PathBuf,
    pub cache: CacheConfig,
    pub http: HttpConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            service_url: "https://iiifman.lib.virginia.edu".to_string(),
            classifier: ClassifierMode::default(),
            tracksys_url: "https://tracksys.lib.virginia.edu".to_string(),
            apollo_url: "https://apollo.lib.virginia.edu".to_string(),
            virgo_solr_url: None,
            iiif_url: "https://iiif.lib.virginia.edu".to_string(),
            database_url: None,
            database_max_connections: 5,
            template: PathBuf::from("templates/iiif.json"),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Command-line overrides. Only the fields that are set take part in the merge.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<ClassifierMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracksys_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apollo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virgo_solr_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iiif_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    pub cache: CacheOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<CacheBackend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,
}

impl Config {
    /// Load, merge and validate the configuration.
    ///
    /// When no file is given, `config.{yaml,toml,json}` in the platform
    /// configuration directory is used if it exists.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match file {
            Some(path) if !path.exists() => {
                exn::bail!(ErrorKind::Invalid(format!("configuration file {} does not exist", path.display())))
            },
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_file(),
        };
        let config: Self = Self::figment(file.as_deref())?
            .merge(Serialized::defaults(overrides))
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(target: "iiifman::config", file = ?file, "configuration loaded");
        Ok(config)
    }

    fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("toml") => figment.merge(Toml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn default_file() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("edu", "virginia", "iiifman")?;
        ["config.yaml", "config.toml", "config.json"]
            .into_iter()
            .map(|name| dirs.config_dir().join(name))
            .find(|path| path.is_file())
    }

    /// Reject settings that cannot work together.
    pub fn validate(&self) -> Result<()> {
        if self.classifier == ClassifierMode::Local && self.database_url.is_none() {
            exn::bail!(ErrorKind::Invalid("the local classifier requires `database_url`".to_string()));
        }
        if self.tracksys_url.is_empty() {
            exn::bail!(ErrorKind::Invalid("`tracksys_url` must be set".to_string()));
        }
        if self.iiif_url.is_empty() {
            exn::bail!(ErrorKind::Invalid("`iiif_url` must be set".to_string()));
        }
        match self.cache.backend {
            CacheBackend::S3 if self.cache.bucket.is_empty() => {
                exn::bail!(ErrorKind::Invalid("the s3 cache requires `cache.bucket`".to_string()))
            },
            CacheBackend::S3 if self.cache.key_id.is_none() || self.cache.key_secret.is_none() => {
                exn::bail!(ErrorKind::Invalid("the s3 cache requires `cache.key_id` and `cache.key_secret`".to_string()))
            },
            CacheBackend::Local if self.cache.directory.is_none() => {
                exn::bail!(ErrorKind::Invalid("the local cache requires `cache.directory`".to_string()))
            },
            _ => {},
        }
        if self.http.connect_timeout_secs == 0 || self.http.request_timeout_secs == 0 || self.http.index_timeout_secs == 0
        {
            exn::bail!(ErrorKind::Invalid("HTTP timeouts must be at least one second".to_string()));
        }
        Ok(())
    }

    /// Whether generated manifests are stored and served from the cache.
    pub fn cache_enabled(&self) -> bool {
        self.cache.backend != CacheBackend::Disabled
    }
}

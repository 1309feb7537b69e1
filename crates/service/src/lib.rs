//! Manifest generation and the cache-aside protocol.
//!
//! A request for a PID is answered from the manifest cache when the request
//! allows it. Otherwise the PID is classified, its record is assembled from
//! the sources its kind calls for, rendered, and written back to the cache.

mod classify;
pub mod error;
mod generate;
mod plan;
mod sources;

pub use crate::classify::{Classification, Classifier, LocalClassifier, RemoteClassifier};
pub use crate::sources::{RecordStore, Upstream};

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use iiifman_cache::{CachePolicy, CacheProxy, RequestFlags, WriteMode, key};
use iiifman_config::Config;
use iiifman_manifest::Renderer;
use std::sync::Arc;
use tracing::instrument;

/// Cache keys of manifests served under `/pid/{pid}`.
const ROUTE: &str = "pid";

/// Public base URLs baked into generated manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    /// This service, for manifests that are not served from the cache.
    pub service_url: String,
    /// Image server the canvases point at.
    pub iiif_url: String,
    pub apollo_url: String,
}

impl From<&Config> for Links {
    fn from(config: &Config) -> Self {
        Self {
            service_url: config.service_url.clone(),
            iiif_url: config.iiif_url.clone(),
            apollo_url: config.apollo_url.clone(),
        }
    }
}

/// Where a manifest body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cached,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub body: String,
    pub source: Source,
}

/// Answer to an existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Existence {
    pub exists: bool,
    pub cached: bool,
    /// Public cache URL, when the manifest is cached.
    pub url: Option<String>,
}

pub struct Service {
    classifier: Arc<dyn Classifier>,
    upstream: Arc<dyn Upstream>,
    store: Option<Arc<dyn RecordStore>>,
    renderer: Renderer,
    cache: CacheProxy,
    links: Links,
}

impl Service {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        upstream: Arc<dyn Upstream>,
        store: Option<Arc<dyn RecordStore>>,
        renderer: Renderer,
        cache: CacheProxy,
        links: Links,
    ) -> Self {
        Self { classifier, upstream, store, renderer, cache, links }
    }

    /// Serve the manifest of a PID, from the cache where the request allows.
    ///
    /// A unit override or `nocache` bypasses the cache entirely; `refresh`
    /// regenerates and overwrites. A failed write is only logged, unless the
    /// caller explicitly asked for a refresh.
    #[instrument(skip(self))]
    pub async fn manifest(&self, pid: &str, flags: RequestFlags) -> Result<Manifest> {
        let key = key(ROUTE, pid, None);
        let policy = CachePolicy::for_request(&flags);
        let mut present = false;
        if policy.read || policy.write == WriteMode::IfAbsent {
            present = self.cached(&key).await;
        }

        if policy.read && present {
            match self.cache.get(&key).await {
                Ok(Some(body)) => return Ok(Manifest { body, source: Source::Cached }),
                Ok(None) => {
                    tracing::debug!(target: "iiifman::service", key = %key, "cached manifest vanished, regenerating");
                    present = false;
                },
                Err(err) => return Err(err).or_raise(|| ErrorKind::CacheRead(key)),
            }
        }

        let classification = self.classifier.classify(pid).await?.ok_or_raise(|| ErrorKind::NotFound(pid.to_string()))?;
        tracing::info!(target: "iiifman::service", pid, kind = %classification.kind, "generating manifest");
        let url = self.manifest_url(pid, flags.unit, &policy, &key);
        let record = self.generate(pid, &classification, flags.unit, url).await?;
        let body = self.renderer.render(&record).or_raise(|| ErrorKind::Render(pid.to_string()))?;

        match policy.write {
            WriteMode::Never => {},
            WriteMode::IfAbsent if present => {},
            WriteMode::IfAbsent => {
                if let Err(err) = self.cache.put(&key, &body).await {
                    tracing::error!(target: "iiifman::service", key = %key, error = %err, "unable to cache manifest");
                }
            },
            WriteMode::Overwrite => self.cache.put(&key, &body).await.or_raise(|| ErrorKind::CacheWrite(key))?,
        }
        Ok(Manifest { body, source: Source::Generated })
    }

    /// Whether a PID has a cached manifest or, failing that, is known at all.
    #[instrument(skip(self))]
    pub async fn exists(&self, pid: &str) -> Existence {
        let key = key(ROUTE, pid, None);
        if self.cached(&key).await {
            return Existence { exists: true, cached: true, url: self.cache.url(&key) };
        }
        Existence { exists: self.identify(pid).await, cached: false, url: None }
    }

    /// Whether the classifier knows the PID. Any failure counts as unknown.
    #[instrument(skip(self))]
    pub async fn identify(&self, pid: &str) -> bool {
        match self.classifier.classify(pid).await {
            Ok(classification) => classification.is_some(),
            Err(err) => {
                tracing::warn!(target: "iiifman::service", pid, error = %err, "classification failed");
                false
            },
        }
    }

    /// A failed lookup is treated as a miss.
    async fn cached(&self, key: &str) -> bool {
        match self.cache.exists(key).await {
            Ok(exists) => exists,
            Err(err) => {
                tracing::warn!(target: "iiifman::service", key, error = %err, "cache lookup failed, treating as a miss");
                false
            },
        }
    }

    /// Public URL a manifest is served from, which becomes its `@id`.
    fn manifest_url(&self, pid: &str, unit: Option<u32>, policy: &CachePolicy, key: &str) -> String {
        if policy.is_cacheable()
            && let Some(url) = self.cache.url(key)
        {
            return url;
        }
        let base = format!("{}/pid/{pid}/manifest.json", self.links.service_url.trim_end_matches('/'));
        match unit {
            Some(unit) => format!("{base}?unit={unit}"),
            None => base,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, FakeUpstream, page, service};
    use iiifman_extract::{BriefMetadata, IndexFields};
    use iiifman_remote::error::ErrorKind as RemoteErrorKind;
    use iiifman_storage::backend::{MockBackend, StorageBackend};
    use iiifman_tracksys::{ComponentRecord, MetadataRecord, PageFilter};
    use rstest::rstest;
    use serde_json::Value;

    const PID: &str = "uva-lib:2528443";
    const KEY: &str = "pid-uva-lib-2528443";

    fn upstream(kind: &str) -> FakeUpstream {
        let mut exemplar = page("tsm:2", "b_0002.tif");
        exemplar.exemplar = Some(true);
        FakeUpstream {
            brief: BriefMetadata {
                title: "Letters Home".to_string(),
                creator: Some("A".to_string()),
                call_number: Some("MSS 1".to_string()),
                catalog_key: Some("u123".to_string()),
                ..BriefMetadata::default()
            },
            index: IndexFields {
                author: Some("B".to_string()),
                date: Some("1820".to_string()),
                ..IndexFields::default()
            },
            pages: vec![page("tsm:1", "b_0001.tif"), exemplar],
            ..FakeUpstream::default()
        }
        .with_kind(PID, kind)
    }

    fn remote(upstream: &Arc<FakeUpstream>) -> Arc<dyn Classifier> {
        Arc::new(RemoteClassifier::new(upstream.clone()))
    }

    fn cache(backend: &Arc<MockBackend>) -> CacheProxy {
        CacheProxy::new(backend.clone(), "https://cache.example", "manifests")
    }

    fn json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    fn metadata_value<'a>(manifest: &'a Value, label: &str) -> Option<&'a str> {
        manifest["metadata"].as_array()?.iter().find(|entry| entry["label"] == label)?["value"].as_str()
    }

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let upstream = Arc::new(upstream("sirsi_metadata"));
        let backend = Arc::new(MockBackend::default());
        let service = service(remote(&upstream), upstream.clone(), None, cache(&backend));

        let first = service.manifest(PID, RequestFlags::default()).await.unwrap();
        let second = service.manifest(PID, RequestFlags::default()).await.unwrap();
        assert_eq!(first.source, Source::Generated);
        assert_eq!(second.source, Source::Cached);
        assert_eq!(first.body, second.body);
        assert_eq!(upstream.page_calls(), 1);
        assert_eq!(backend.writes(), 1);
        assert_eq!(json(&first.body)["@id"], format!("https://cache.example/manifests/{KEY}"));
    }

    #[tokio::test]
    async fn test_cached_body_is_returned_verbatim() {
        let upstream = Arc::new(upstream("sirsi_metadata"));
        let backend = Arc::new(MockBackend::with_objects([(KEY, "{\"cached\": true}")]));
        let service = service(remote(&upstream), upstream.clone(), None, cache(&backend));

        let manifest = service.manifest(PID, RequestFlags::default()).await.unwrap();
        assert_eq!(manifest, Manifest { body: "{\"cached\": true}".to_string(), source: Source::Cached });
        assert_eq!(upstream.page_calls(), 0);
    }

    #[tokio::test]
    async fn test_unit_request_bypasses_cache() {
        let upstream = Arc::new(upstream("sirsi_metadata"));
        let backend = Arc::new(MockBackend::with_objects([(KEY, "{}")]));
        let service = service(remote(&upstream), upstream.clone(), None, cache(&backend));
        let flags = RequestFlags { unit: Some(3), ..RequestFlags::default() };

        for _ in 0..2 {
            let manifest = service.manifest(PID, flags).await.unwrap();
            assert_eq!(manifest.source, Source::Generated);
            assert_eq!(json(&manifest.body)["@id"], format!("https://iiifman.example/pid/{PID}/manifest.json?unit=3"));
        }
        assert_eq!(backend.reads(), 0);
        assert_eq!(backend.writes(), 0);
        assert_eq!(*upstream.units.lock().unwrap(), vec![Some(3), Some(3)]);
    }

    #[tokio::test]
    async fn test_unit_is_not_passed_for_collections() {
        let upstream = Arc::new(upstream("apollo_metadata"));
        let service = service(remote(&upstream), upstream.clone(), None, CacheProxy::disabled());
        let flags = RequestFlags { unit: Some(3), ..RequestFlags::default() };

        let manifest = json(&service.manifest(PID, flags).await.unwrap().body);
        assert_eq!(*upstream.units.lock().unwrap(), vec![None]);
        assert_eq!(manifest["label"], "Letters Home: Folder 1");
        assert_eq!(manifest["related"], format!("https://apollo.example/items/{PID}"));
    }

    #[tokio::test]
    async fn test_nocache_neither_reads_nor_writes() {
        let upstream = Arc::new(upstream("sirsi_metadata"));
        let backend = Arc::new(MockBackend::with_objects([(KEY, "{}")]));
        let service = service(remote(&upstream), upstream.clone(), None, cache(&backend));
        let flags = RequestFlags { nocache: true, ..RequestFlags::default() };

        let manifest = service.manifest(PID, flags).await.unwrap();
        assert_eq!(manifest.source, Source::Generated);
        assert_eq!(backend.writes(), 0);
        assert_eq!(backend.read(KEY).await.unwrap(), b"{}");
        assert_eq!(json(&manifest.body)["@id"], format!("https://iiifman.example/pid/{PID}/manifest.json"));
    }

    #[tokio::test]
    async fn test_refresh_overwrites() {
        let upstream = Arc::new(upstream("sirsi_metadata"));
        let backend = Arc::new(MockBackend::with_objects([(KEY, "{}")]));
        let service = service(remote(&upstream), upstream.clone(), None, cache(&backend));
        let flags = RequestFlags { refresh: true, ..RequestFlags::default() };

        let manifest = service.manifest(PID, flags).await.unwrap();
        assert_eq!(manifest.source, Source::Generated);
        assert_eq!(backend.read(KEY).await.unwrap(), manifest.body.as_bytes());
        assert_eq!(backend.content_type(KEY).await.as_deref(), Some("application/json; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_write_failure_is_only_fatal_on_refresh() {
        let upstream = Arc::new(upstream("sirsi_metadata"));
        let backend = Arc::new(MockBackend::default());
        backend.fail(true);
        let service = service(remote(&upstream), upstream.clone(), None, cache(&backend));

        let manifest = service.manifest(PID, RequestFlags::default()).await.unwrap();
        assert_eq!(manifest.source, Source::Generated);

        let flags = RequestFlags { refresh: true, ..RequestFlags::default() };
        let err = service.manifest(PID, flags).await.unwrap_err();
        assert_eq!(*err, ErrorKind::CacheWrite(KEY.to_string()));
        assert_eq!(err.status(), 500);
    }

    #[rstest]
    #[case::timeout(RemoteErrorKind::Timeout("http://ts/api".to_string()), 503)]
    #[case::refused(RemoteErrorKind::Refused("http://ts/api".to_string()), 503)]
    #[case::status(RemoteErrorKind::Status { url: "http://ts/api".to_string(), status: 500, body: "boom".to_string() }, 502)]
    #[case::malformed(RemoteErrorKind::Malformed("http://ts/api".to_string()), 422)]
    #[tokio::test]
    async fn test_primary_failure_is_not_cached(#[case] failure: RemoteErrorKind, #[case] status: u16) {
        let upstream = Arc::new(FakeUpstream { failure: Some(failure), ..upstream("sirsi_metadata") });
        let backend = Arc::new(MockBackend::default());
        let service = service(remote(&upstream), upstream.clone(), None, cache(&backend));

        let err = service.manifest(PID, RequestFlags::default()).await.unwrap_err();
        assert_eq!(err.status(), status);
        assert_eq!(backend.writes(), 0);
    }

    #[tokio::test]
    async fn test_enrichment_failure_is_absorbed() {
        let upstream = Arc::new(FakeUpstream {
            enrichment_failure: Some(RemoteErrorKind::Timeout("http://solr".to_string())),
            ..upstream("xml_metadata")
        });
        let service = service(remote(&upstream), upstream.clone(), None, CacheProxy::disabled());

        let manifest = json(&service.manifest(PID, RequestFlags::default()).await.unwrap().body);
        assert_eq!(manifest["label"], "Letters Home");
        assert_eq!(metadata_value(&manifest, "Author"), None);
        assert_eq!(metadata_value(&manifest, "Date"), None);
    }

    #[tokio::test]
    async fn test_empty_index_record_adds_nothing() {
        let upstream = Arc::new(FakeUpstream { index: IndexFields::default(), ..upstream("xml_metadata") });
        let service = service(remote(&upstream), upstream.clone(), None, CacheProxy::disabled());

        let manifest = json(&service.manifest(PID, RequestFlags::default()).await.unwrap().body);
        let labels: Vec<_> = manifest["metadata"].as_array().unwrap().iter().map(|e| e["label"].clone()).collect();
        assert_eq!(labels, ["Call Number"]);
    }

    #[rstest]
    #[case::sirsi("sirsi_metadata", Some("A"))]
    #[case::xml("xml_metadata", Some("B"))]
    #[case::external("external_metadata", None)]
    #[tokio::test]
    async fn test_author_precedence(#[case] kind: &str, #[case] author: Option<&str>) {
        let upstream = Arc::new(upstream(kind));
        let service = service(remote(&upstream), upstream.clone(), None, CacheProxy::disabled());

        let manifest = json(&service.manifest(PID, RequestFlags::default()).await.unwrap().body);
        assert_eq!(metadata_value(&manifest, "Author"), author);
    }

    #[tokio::test]
    async fn test_flagged_exemplar_is_start_canvas() {
        let upstream = Arc::new(upstream("sirsi_metadata"));
        let service = service(remote(&upstream), upstream.clone(), None, CacheProxy::disabled());

        let manifest = json(&service.manifest(PID, RequestFlags::default()).await.unwrap().body);
        let sequence = &manifest["sequences"][0];
        assert_eq!(sequence["startCanvas"], format!("https://iiifman.example/pid/{PID}/manifest.json/canvas/c1"));
        assert_eq!(sequence["canvases"].as_array().unwrap().len(), 2);
    }

    #[rstest]
    #[case::unknown_pid("uva-lib:404", "sirsi_metadata")]
    #[case::unsupported_type(PID, "bogus_metadata")]
    #[tokio::test]
    async fn test_not_found(#[case] pid: &str, #[case] kind: &str) {
        let upstream = Arc::new(upstream(kind));
        let backend = Arc::new(MockBackend::default());
        let service = service(remote(&upstream), upstream.clone(), None, cache(&backend));

        let err = service.manifest(pid, RequestFlags::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(pid.to_string()));
        assert_eq!(err.status(), 404);
        assert_eq!(backend.writes(), 0);
    }

    fn xml_store() -> FakeStore {
        let mods = r#"<mods xmlns="http://www.loc.gov/mods/v3">
                <titleInfo><title>Letter to Thomas Jefferson</title></titleInfo>
            </mods>"#;
        FakeStore {
            metadata: Some((
                PID.to_string(),
                MetadataRecord {
                    id: 7,
                    kind: "XmlMetadata".to_string(),
                    brief: BriefMetadata {
                        title: "Jefferson Papers".to_string(),
                        creator: Some("A".to_string()),
                        exemplar: Some("b_0002.tif".to_string()),
                        ..BriefMetadata::default()
                    },
                    descriptive: Some(mods.to_string()),
                },
            )),
            pages: vec![page("tsm:1", "b_0001.tif"), page("tsm:2", "b_0002.tif")],
            ..FakeStore::default()
        }
    }

    #[tokio::test]
    async fn test_relational_xml_record() {
        let upstream = Arc::new(upstream("sirsi_metadata"));
        let store = Arc::new(xml_store());
        let classifier = Arc::new(LocalClassifier::new(store.clone(), None));
        let service = service(classifier, upstream.clone(), Some(store.clone()), CacheProxy::disabled());

        let manifest = json(&service.manifest(PID, RequestFlags::default()).await.unwrap().body);
        assert_eq!(manifest["label"], "Jefferson Papers");
        assert_eq!(metadata_value(&manifest, "Author"), Some("B"));
        let canvases = manifest["sequences"][0]["canvases"].as_array().unwrap();
        assert!(canvases.iter().all(|canvas| canvas["label"] == "Letter to Thomas Jefferson"));
        assert_eq!(manifest["thumbnail"]["@id"], "https://iiif.example/tsm:2/full/!200,200/0/default.jpg");
        assert_eq!(*store.filters.lock().unwrap(), vec![PageFilter::DigitalLibrary]);
        assert_eq!(upstream.page_calls(), 0);
    }

    #[tokio::test]
    async fn test_relational_component() {
        let upstream = Arc::new(FakeUpstream::default());
        let store = Arc::new(FakeStore {
            component: Some((
                PID.to_string(),
                ComponentRecord { id: 3, title: "Box 1\tFolder 2".to_string(), exemplar: None },
            )),
            pages: vec![page("tsm:1", "b_0001.tif")],
            ..FakeStore::default()
        });
        let classifier = Arc::new(LocalClassifier::new(store.clone(), None));
        let service = service(classifier, upstream, Some(store), CacheProxy::disabled());

        let manifest = json(&service.manifest(PID, RequestFlags::default()).await.unwrap().body);
        assert_eq!(manifest["label"], "Box 1 Folder 2");
        assert_eq!(manifest.get("thumbnail"), None);
    }

    #[tokio::test]
    async fn test_legacy_identifier() {
        let mut upstream = upstream("sirsi_metadata");
        upstream.legacy.insert("uva-an109873".to_string(), "uva-an1".to_string());
        let upstream = Arc::new(upstream);
        let store = Arc::new(FakeStore::default());
        let classifier = LocalClassifier::new(store, Some(upstream.clone()));

        let classification = classifier.classify("uva-an109873").await.unwrap();
        assert_eq!(classification, Some(Classification::new(iiifman_manifest::RecordKind::CollectionMetadata, "uva-an1")));
        assert_eq!(classifier.classify("uva-an404").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_legacy_manifest_pages_use_requested_pid() {
        let mut upstream = upstream("sirsi_metadata");
        upstream.legacy.insert("uva-an109873".to_string(), "uva-an1".to_string());
        let upstream = Arc::new(upstream);
        let store = Arc::new(FakeStore::default());
        let classifier = Arc::new(LocalClassifier::new(store.clone(), Some(upstream.clone())));
        let service = service(classifier, upstream.clone(), Some(store), CacheProxy::disabled());

        let manifest = service.manifest("uva-an109873", RequestFlags::default()).await.unwrap();
        let manifest = json(&manifest.body);
        assert_eq!(*upstream.collection_pids.lock().unwrap(), vec!["uva-an1".to_string()]);
        assert_eq!(*upstream.page_pids.lock().unwrap(), vec!["uva-an109873".to_string()]);
        assert_eq!(manifest["related"], "https://apollo.example/items/uva-an1");
    }

    #[rstest]
    #[case::timeout(RemoteErrorKind::Timeout("http://apollo/api".to_string()))]
    #[case::refused(RemoteErrorKind::Refused("http://apollo/api".to_string()))]
    #[case::status(RemoteErrorKind::Status { url: "http://apollo/api".to_string(), status: 500, body: "boom".to_string() })]
    #[tokio::test]
    async fn test_legacy_lookup_failure_is_not_found(#[case] failure: RemoteErrorKind) {
        let upstream = Arc::new(FakeUpstream { legacy_failure: Some(failure), ..upstream("sirsi_metadata") });
        let store = Arc::new(FakeStore::default());
        let classifier = Arc::new(LocalClassifier::new(store.clone(), Some(upstream.clone())));
        let service = service(classifier, upstream.clone(), Some(store), CacheProxy::disabled());

        let err = service.manifest("uva-an109873", RequestFlags::default()).await.unwrap_err();
        assert_eq!(err.status(), 404);
        assert_eq!(upstream.page_calls(), 0);
    }

    #[tokio::test]
    async fn test_exists() {
        let upstream = Arc::new(upstream("sirsi_metadata").with_kind("uva-lib:2", "xml_metadata"));
        let backend = Arc::new(MockBackend::with_objects([(KEY, "{}")]));
        let service = service(remote(&upstream), upstream.clone(), None, cache(&backend));

        assert_eq!(
            service.exists(PID).await,
            Existence { exists: true, cached: true, url: Some(format!("https://cache.example/manifests/{KEY}")) }
        );
        assert_eq!(service.exists("uva-lib:2").await, Existence { exists: true, cached: false, url: None });
        assert_eq!(service.exists("uva-lib:3").await, Existence { exists: false, cached: false, url: None });
    }
}

//! Identifier classification.
//!
//! Exactly one strategy is active per deployment. Either way, a PID nobody
//! knows is `Ok(None)`, not an error; only infrastructure failures are errors.
//! The legacy identifier lookup is a last resort, so its failures also read
//! as "unknown".

use crate::error::{ErrorKind, Result, upstream};
use crate::sources::{RecordStore, Upstream};
use async_trait::async_trait;
use exn::ResultExt;
use iiifman_manifest::RecordKind;
use iiifman_tracksys::Table;
use std::sync::Arc;
use tracing::instrument;

/// What a PID names, and which PID to ask the sources about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: RecordKind,
    /// Usually the requested PID; legacy identifiers resolve to the PID they
    /// were migrated to.
    pub source_pid: String,
}

impl Classification {
    pub fn new(kind: RecordKind, source_pid: impl Into<String>) -> Self {
        Self { kind, source_pid: source_pid.into() }
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, pid: &str) -> Result<Option<Classification>>;
}

/// Trusts the tracking service's answer to `/api/pid/{pid}/type`.
pub struct RemoteClassifier {
    upstream: Arc<dyn Upstream>,
}

impl RemoteClassifier {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    #[instrument(skip(self))]
    async fn classify(&self, pid: &str) -> Result<Option<Classification>> {
        let answer = self
            .upstream
            .pid_type(pid)
            .await
            .map_err(|err| upstream(&format!("unable to classify {pid}"), err))?;
        let Some(answer) = answer else { return Ok(None) };
        match answer.parse::<RecordKind>() {
            Ok(kind) => {
                tracing::debug!(target: "iiifman::service", pid, kind = %kind, "classified");
                Ok(Some(Classification::new(kind, pid)))
            },
            Err(_) => {
                tracing::warn!(target: "iiifman::service", pid, answer = %answer, "unsupported record type");
                Ok(None)
            },
        }
    }
}

/// Looks the PID up in the relational tables, falling back to the
/// collection system's legacy identifiers.
pub struct LocalClassifier {
    store: Arc<dyn RecordStore>,
    legacy: Option<Arc<dyn Upstream>>,
}

impl LocalClassifier {
    pub fn new(store: Arc<dyn RecordStore>, legacy: Option<Arc<dyn Upstream>>) -> Self {
        Self { store, legacy }
    }
}

#[async_trait]
impl Classifier for LocalClassifier {
    #[instrument(skip(self))]
    async fn classify(&self, pid: &str) -> Result<Option<Classification>> {
        let table = self.store.classify(pid).await.or_raise(|| ErrorKind::Database)?;
        match table {
            Some(Table::Metadata) => return Ok(Some(Classification::new(RecordKind::DbMetadata, pid))),
            Some(Table::Component) => return Ok(Some(Classification::new(RecordKind::DbComponent, pid))),
            None => {},
        }
        let Some(legacy) = &self.legacy else { return Ok(None) };
        let migrated = match legacy.legacy_lookup(pid).await {
            Ok(migrated) => migrated,
            Err(err) => {
                tracing::warn!(target: "iiifman::service", pid, error = %err, "legacy identifier lookup failed");
                None
            },
        };
        Ok(migrated.map(|source_pid| {
            tracing::info!(target: "iiifman::service", pid, source_pid = %source_pid, "legacy identifier");
            Classification::new(RecordKind::CollectionMetadata, source_pid)
        }))
    }
}

//! Manifest generation.
//!
//! Sources are visited in a fixed order: primary record, then enrichment,
//! then the page list. A failing primary source or page list fails the
//! request; a failing enrichment source is logged and the manifest is
//! generated without it.

use crate::Service;
use crate::classify::Classification;
use crate::error::{ErrorKind, Result, upstream};
use crate::plan::{Enrichment, Pages, Pipeline, Primary};
use crate::sources::RecordStore;
use exn::{OptionExt, ResultExt};
use iiifman_extract::PageRecord;
use iiifman_manifest::{Draft, ExemplarRule, ManifestRecord, RecordKind, build};
use iiifman_tracksys::PageFilter;
use tracing::instrument;

impl Service {
    /// Assemble the manifest record of a classified PID.
    ///
    /// `url` is the public URL the manifest will be served from, and becomes
    /// its `@id`.
    #[instrument(skip(self, classification, url), fields(kind = %classification.kind))]
    pub(crate) async fn generate(
        &self,
        pid: &str,
        classification: &Classification,
        unit: Option<u32>,
        url: String,
    ) -> Result<ManifestRecord> {
        let source_pid = classification.source_pid.as_str();
        let pipeline = Pipeline::for_kind(classification.kind);
        let (mut draft, pages, rule) = match pipeline.primary {
            Primary::Brief => {
                let brief = self
                    .upstream
                    .brief_metadata(source_pid)
                    .await
                    .map_err(|err| upstream(&format!("unable to retrieve metadata for {pid}"), err))?;
                let mut draft = self.draft(classification.kind, pid, url);
                draft.brief(&brief);
                self.enrich(&mut draft, source_pid).await;
                let pages = self.remote_pages(pid, pipeline.pages, unit).await?;
                (draft, pages, ExemplarRule::Flag)
            },
            Primary::Collection => {
                let collection = self
                    .upstream
                    .collection_metadata(source_pid)
                    .await
                    .map_err(|err| upstream(&format!("unable to retrieve collection item {source_pid}"), err))?;
                let mut draft = self.draft(classification.kind, pid, url);
                draft
                    .collection(&collection)
                    .related(format!("{}/items/{source_pid}", self.links.apollo_url.trim_end_matches('/')));
                // Master files are owned by the tracking service, which only
                // knows the requested PID, even for migrated identifiers.
                let pages = self.remote_pages(pid, pipeline.pages, unit).await?;
                (draft, pages, ExemplarRule::Flag)
            },
            Primary::MetadataTable => {
                let store = self.store()?;
                let record = store
                    .metadata(source_pid)
                    .await
                    .or_raise(|| ErrorKind::Database)?
                    .ok_or_raise(|| ErrorKind::NotFound(pid.to_string()))?;
                let kind = classification.kind.refine(&record.kind);
                tracing::debug!(target: "iiifman::service", pid, stored = %record.kind, kind = %kind, "metadata record");
                let mut draft = self.draft(kind, pid, url);
                draft.brief(&record.brief);
                self.enrich(&mut draft, source_pid).await;
                let filter = PageFilter::select(unit, kind.is_external());
                let mut pages = store.metadata_pages(record.id, filter).await.or_raise(|| ErrorKind::Database)?;
                if kind == RecordKind::XmlMetadata
                    && let Some(mods) = &record.descriptive
                {
                    for page in pages.iter_mut().filter(|page| page.descriptive.is_none()) {
                        page.descriptive = Some(mods.clone());
                    }
                }
                (draft, pages, ExemplarRule::filename(record.brief.exemplar.as_deref()))
            },
            Primary::ComponentTable => {
                let store = self.store()?;
                let component = store
                    .component(source_pid)
                    .await
                    .or_raise(|| ErrorKind::Database)?
                    .ok_or_raise(|| ErrorKind::NotFound(pid.to_string()))?;
                let mut draft = self.draft(classification.kind, pid, url);
                draft.title(&component.title);
                let pages = store.component_pages(component.id).await.or_raise(|| ErrorKind::Database)?;
                (draft, pages, ExemplarRule::filename(component.exemplar.as_deref()))
            },
        };
        let pages = build(pages, &rule);
        tracing::info!(
            target: "iiifman::service",
            pid,
            pages = pages.master_files.len(),
            start_page = pages.start_page,
            "page list built"
        );
        draft.pages(pages);
        Ok(draft.finish())
    }

    fn draft(&self, kind: RecordKind, pid: &str, url: String) -> Draft {
        Draft::new(kind, pid, url, &self.links.iiif_url)
    }

    fn store(&self) -> Result<&dyn RecordStore> {
        self.store.as_deref().ok_or_raise(|| ErrorKind::Database)
    }

    async fn remote_pages(&self, pid: &str, pages: Pages, unit: Option<u32>) -> Result<Vec<PageRecord>> {
        let unit = match pages {
            Pages::Remote { unit: true } => unit,
            _ => None,
        };
        self.upstream
            .page_list(pid, unit)
            .await
            .map_err(|err| upstream(&format!("unable to retrieve pages of {pid}"), err))
    }

    /// Fill optional fields from the search index the record kind calls for.
    async fn enrich(&self, draft: &mut Draft, source_pid: &str) {
        let fields = match Enrichment::for_kind(draft.kind()) {
            Enrichment::None => return,
            Enrichment::Catalog => {
                let catalog_key = draft.catalog_key().to_string();
                match self.upstream.catalog_index(&catalog_key).await {
                    Ok(Some(fields)) => Ok(fields),
                    Ok(None) => {
                        tracing::debug!(target: "iiifman::service", catalog_key = %catalog_key, "no catalog index configured");
                        return;
                    },
                    Err(err) => Err(err),
                }
            },
            Enrichment::Repository => self.upstream.repository_index(source_pid).await,
        };
        match fields {
            Ok(fields) if fields.is_empty() => {
                tracing::debug!(target: "iiifman::service", pid = source_pid, "index has no record");
            },
            Ok(fields) => {
                draft.enrich(&fields);
            },
            Err(err) => {
                tracing::warn!(target: "iiifman::service", pid = source_pid, error = %err, "enrichment failed, continuing without it");
            },
        }
    }
}

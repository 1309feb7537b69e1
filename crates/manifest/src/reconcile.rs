//! Merging source payloads into a [`ManifestRecord`].
//!
//! A [`Draft`] is seeded from exactly one primary source, optionally enriched
//! from a search index record, given its page list, and then frozen. The
//! rules for which source wins each field live here and nowhere else:
//!
//! - the title comes from the primary source;
//! - the catalog key is the primary source's, falling back to the PID;
//! - `Author` comes from the primary creator only for catalog records, and
//!   from the index only for MODS-described records;
//! - `Call Number` keeps the first value it was given;
//! - setting a label twice overwrites the value in place.

use crate::kind::{AuthorSource, RecordKind};
use crate::pages::PageList;
use crate::record::{ManifestRecord, Metadata};
use iiifman_extract::{BriefMetadata, CollectionMetadata, IndexFields, sanitize};

/// A manifest record still being assembled.
#[derive(Debug, Clone)]
pub struct Draft {
    kind: RecordKind,
    record: ManifestRecord,
}

impl Draft {
    pub fn new(
        kind: RecordKind,
        pid: impl Into<String>,
        url: impl Into<String>,
        iiif_server_url: impl Into<String>,
    ) -> Self {
        let pid = pid.into();
        let record = ManifestRecord {
            catalog_key: pid.clone(),
            pid,
            iiif_server_url: sanitize(&iiif_server_url.into()),
            url: sanitize(&url.into()),
            title: String::new(),
            advisory: None,
            license: None,
            related: None,
            metadata: Metadata::default(),
            master_files: Vec::new(),
            start_page: 0,
            exemplar_pid: String::new(),
            exemplar_rotation: None,
        };
        Self { kind, record }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Key to look the record up by in the catalog index.
    pub fn catalog_key(&self) -> &str {
        &self.record.catalog_key
    }

    /// Seed from a flat brief record (TrackSys or the `metadata` table).
    pub fn brief(&mut self, brief: &BriefMetadata) -> &mut Self {
        self.title(&brief.title);
        self.set_catalog_key(brief.catalog_key.as_deref());
        if self.kind.author_source() == AuthorSource::Primary
            && let Some(creator) = non_blank(brief.creator.as_deref())
        {
            self.record.metadata.set(Metadata::AUTHOR, sanitize(creator));
        }
        self.call_number(brief.call_number.as_deref());
        self.record.license = non_blank(brief.rights.as_deref()).map(sanitize);
        self.record.advisory = non_blank(brief.advisory.as_deref()).map(sanitize);
        self
    }

    /// Seed from an Apollo collection item.
    pub fn collection(&mut self, collection: &CollectionMetadata) -> &mut Self {
        self.title(&collection.title);
        self.set_catalog_key(collection.catalog_key.as_deref());
        self.call_number(collection.call_number.as_deref());
        self.record.license = non_blank(collection.rights.as_deref()).map(sanitize);
        self
    }

    pub fn title(&mut self, title: &str) -> &mut Self {
        self.record.title = sanitize(title.trim());
        self
    }

    pub fn related(&mut self, related: impl Into<String>) -> &mut Self {
        self.record.related = Some(sanitize(&related.into()));
        self
    }

    /// Fill optional fields from a search index record.
    pub fn enrich(&mut self, fields: &IndexFields) -> &mut Self {
        if let Some(format) = non_blank(fields.format.as_deref()) {
            self.record.metadata.set(Metadata::FORMAT, sanitize(format));
        }
        if let Some(date) = non_blank(fields.date.as_deref()) {
            self.record.metadata.set(Metadata::DATE, sanitize(date));
        }
        if let Some(physical) = non_blank(fields.physical_description.as_deref()) {
            self.record.metadata.set(Metadata::PHYSICAL_DESCRIPTION, sanitize(physical));
        }
        if self.kind.author_source() == AuthorSource::Index
            && let Some(author) = non_blank(fields.author.as_deref())
        {
            self.record.metadata.set(Metadata::AUTHOR, sanitize(author));
        }
        self.call_number(fields.call_number.as_deref());
        self
    }

    pub fn pages(&mut self, pages: PageList) -> &mut Self {
        self.record.master_files = pages.master_files;
        self.record.start_page = pages.start_page;
        let (pid, rotation) = pages.exemplar.unzip();
        self.record.exemplar_pid = pid.unwrap_or_default();
        self.record.exemplar_rotation = rotation;
        self
    }

    pub fn finish(self) -> ManifestRecord {
        self.record
    }

    fn set_catalog_key(&mut self, catalog_key: Option<&str>) {
        if let Some(key) = non_blank(catalog_key) {
            self.record.catalog_key = key.to_string();
        }
    }

    fn call_number(&mut self, call_number: Option<&str>) {
        if let Some(call_number) = non_blank(call_number)
            && !self.record.metadata.contains(Metadata::CALL_NUMBER)
        {
            self.record.metadata.set(Metadata::CALL_NUMBER, sanitize(call_number));
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

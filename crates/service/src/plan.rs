//! The record kind → generation pipeline table.

use iiifman_manifest::RecordKind;

/// Where the title and identifiers of a record come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primary {
    /// Brief record from the tracking service.
    Brief,
    /// Item tree from the collection system.
    Collection,
    /// The relational `metadata` table.
    MetadataTable,
    /// The relational `components` table.
    ComponentTable,
}

/// Optional search index the record is enriched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Enrichment {
    None,
    /// Catalog index, looked up by catalog key.
    Catalog,
    /// The tracking service's own index, looked up by PID.
    Repository,
}

/// Where the page list comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pages {
    /// Tracking service manifest endpoint; `unit` says whether a unit
    /// override is passed along.
    Remote { unit: bool },
    Metadata,
    Component,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pipeline {
    pub(crate) primary: Primary,
    pub(crate) enrichment: Enrichment,
    pub(crate) pages: Pages,
}

impl Pipeline {
    /// Pipeline for a classified record.
    ///
    /// Relational metadata records are planned as `DbMetadata` and only learn
    /// their enrichment once the stored type is known; see [`Enrichment::for_kind`].
    pub(crate) fn for_kind(kind: RecordKind) -> Self {
        let (primary, pages) = match kind {
            RecordKind::DbMetadata => (Primary::MetadataTable, Pages::Metadata),
            RecordKind::DbComponent => (Primary::ComponentTable, Pages::Component),
            RecordKind::SirsiMetadata | RecordKind::XmlMetadata => (Primary::Brief, Pages::Remote { unit: true }),
            RecordKind::CollectionMetadata => (Primary::Collection, Pages::Remote { unit: false }),
            RecordKind::ExternalMetadata | RecordKind::Component => (Primary::Brief, Pages::Remote { unit: false }),
        };
        Self { primary, enrichment: Enrichment::for_kind(kind), pages }
    }
}

impl Enrichment {
    pub(crate) fn for_kind(kind: RecordKind) -> Self {
        match kind {
            RecordKind::SirsiMetadata => Self::Catalog,
            RecordKind::XmlMetadata => Self::Repository,
            _ => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::sirsi(RecordKind::SirsiMetadata, Primary::Brief, Enrichment::Catalog, Pages::Remote { unit: true })]
    #[case::xml(RecordKind::XmlMetadata, Primary::Brief, Enrichment::Repository, Pages::Remote { unit: true })]
    #[case::collection(RecordKind::CollectionMetadata, Primary::Collection, Enrichment::None, Pages::Remote { unit: false })]
    #[case::external(RecordKind::ExternalMetadata, Primary::Brief, Enrichment::None, Pages::Remote { unit: false })]
    #[case::component(RecordKind::Component, Primary::Brief, Enrichment::None, Pages::Remote { unit: false })]
    #[case::db_metadata(RecordKind::DbMetadata, Primary::MetadataTable, Enrichment::None, Pages::Metadata)]
    #[case::db_component(RecordKind::DbComponent, Primary::ComponentTable, Enrichment::None, Pages::Component)]
    fn test_pipeline_table(
        #[case] kind: RecordKind,
        #[case] primary: Primary,
        #[case] enrichment: Enrichment,
        #[case] pages: Pages,
    ) {
        assert_eq!(Pipeline::for_kind(kind), Pipeline { primary, enrichment, pages });
    }
}

use crate::error::{Error, ErrorKind};
use std::str::FromStr;

/// What a PID names, and therefore which sources describe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A row of the relational `metadata` table whose type is not yet known.
    DbMetadata,
    /// A row of the relational `components` table.
    DbComponent,
    /// Catalog (Sirsi) record.
    SirsiMetadata,
    /// Record described by MODS held in TrackSys.
    XmlMetadata,
    /// Item curated in Apollo.
    CollectionMetadata,
    /// Record described by an external archival system.
    ExternalMetadata,
    Component,
}

/// Where the `Author` entry of a record may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorSource {
    /// The creator of the primary record.
    Primary,
    /// The author field of the search index record.
    Index,
    Neither,
}

impl RecordKind {
    /// Narrow a relational metadata record using its stored `type` column.
    ///
    /// Unknown types leave the kind as it was.
    pub fn refine(self, type_column: &str) -> Self {
        match (self, type_column) {
            (Self::DbMetadata, "SirsiMetadata") => Self::SirsiMetadata,
            (Self::DbMetadata, "XmlMetadata") => Self::XmlMetadata,
            (Self::DbMetadata, "ExternalMetadata") => Self::ExternalMetadata,
            (kind, _) => kind,
        }
    }

    pub fn author_source(self) -> AuthorSource {
        match self {
            Self::SirsiMetadata => AuthorSource::Primary,
            Self::XmlMetadata => AuthorSource::Index,
            _ => AuthorSource::Neither,
        }
    }

    /// External records show every page, published or not.
    pub fn is_external(self) -> bool {
        self == Self::ExternalMetadata
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DbMetadata => "metadata",
            Self::DbComponent => "component",
            Self::SirsiMetadata => "sirsi_metadata",
            Self::XmlMetadata => "xml_metadata",
            Self::CollectionMetadata => "apollo_metadata",
            Self::ExternalMetadata => "external_metadata",
            Self::Component => "component",
        }
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    /// Parse the type names answered by the tracking service.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sirsi_metadata" => Ok(Self::SirsiMetadata),
            "xml_metadata" => Ok(Self::XmlMetadata),
            "apollo_metadata" => Ok(Self::CollectionMetadata),
            "external_metadata" | "archivesspace_metadata" => Ok(Self::ExternalMetadata),
            "component" => Ok(Self::Component),
            other => Err(ErrorKind::UnknownKind(other.to_string()).into()),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sirsi_metadata", RecordKind::SirsiMetadata)]
    #[case("xml_metadata", RecordKind::XmlMetadata)]
    #[case("apollo_metadata", RecordKind::CollectionMetadata)]
    #[case("external_metadata", RecordKind::ExternalMetadata)]
    #[case("archivesspace_metadata", RecordKind::ExternalMetadata)]
    #[case("component\n", RecordKind::Component)]
    fn test_parse(#[case] input: &str, #[case] expected: RecordKind) {
        assert_eq!(input.parse::<RecordKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "invalid".parse::<RecordKind>().unwrap_err();
        assert_eq!(*err, ErrorKind::UnknownKind("invalid".to_string()));
    }

    #[rstest]
    #[case("SirsiMetadata", RecordKind::SirsiMetadata)]
    #[case("XmlMetadata", RecordKind::XmlMetadata)]
    #[case("ExternalMetadata", RecordKind::ExternalMetadata)]
    #[case("Mystery", RecordKind::DbMetadata)]
    fn test_refine(#[case] type_column: &str, #[case] expected: RecordKind) {
        assert_eq!(RecordKind::DbMetadata.refine(type_column), expected);
    }

    #[test]
    fn test_refine_only_applies_to_db_metadata() {
        assert_eq!(RecordKind::DbComponent.refine("SirsiMetadata"), RecordKind::DbComponent);
    }

    #[test]
    fn test_author_gating() {
        assert_eq!(RecordKind::SirsiMetadata.author_source(), AuthorSource::Primary);
        assert_eq!(RecordKind::XmlMetadata.author_source(), AuthorSource::Index);
        assert_eq!(RecordKind::CollectionMetadata.author_source(), AuthorSource::Neither);
    }
}

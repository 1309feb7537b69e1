use serde::{Serialize, Serializer};

/// Image rotation, in the IIIF image API's own notation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
    /// Mirrored around the vertical axis.
    Mirrored,
}

impl Rotation {
    /// Map a TrackSys orientation keyword; anything unrecognised is upright.
    pub fn from_orientation(orientation: Option<&str>) -> Self {
        match orientation.map(str::trim) {
            Some("flip_y_axis") => Self::Mirrored,
            Some("rotate90") => Self::Clockwise90,
            Some("rotate180") => Self::Clockwise180,
            Some("rotate270") => Self::Clockwise270,
            _ => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Clockwise90 => "90",
            Self::Clockwise180 => "180",
            Self::Clockwise270 => "270",
            Self::Mirrored => "!0",
        }
    }
}

impl Serialize for Rotation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One image in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MasterFile {
    /// Identity of the image; for cloned pages, the original's PID.
    pub pid: String,
    pub title: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
    pub exemplar: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub name: &'static str,
    pub value: String,
}

/// Labelled descriptive fields, in the order they were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata(Vec<MetadataEntry>);

impl Metadata {
    pub const AUTHOR: &'static str = "Author";
    pub const CALL_NUMBER: &'static str = "Call Number";
    pub const DATE: &'static str = "Date";
    pub const FORMAT: &'static str = "Format";
    pub const PHYSICAL_DESCRIPTION: &'static str = "Physical Description";

    /// Set a field. A label that is already present keeps its position and
    /// takes the new value.
    pub fn set(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.value = value,
            None => self.0.push(MetadataEntry { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|entry| entry.name == name).map(|entry| entry.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataEntry> {
        self.0.iter()
    }
}

/// Everything the template needs to render one manifest.
///
/// Built by [`Draft`](crate::Draft) and read-only afterwards. Text fields are
/// already sanitized for embedding in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRecord {
    pub(crate) pid: String,
    pub(crate) iiif_server_url: String,
    pub(crate) url: String,
    pub(crate) catalog_key: String,
    pub(crate) title: String,
    pub(crate) advisory: Option<String>,
    pub(crate) license: Option<String>,
    pub(crate) related: Option<String>,
    pub(crate) metadata: Metadata,
    pub(crate) master_files: Vec<MasterFile>,
    pub(crate) start_page: usize,
    /// Empty when no page is the exemplar.
    pub(crate) exemplar_pid: String,
    pub(crate) exemplar_rotation: Option<Rotation>,
}

impl ManifestRecord {
    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn iiif_server_url(&self) -> &str {
        &self.iiif_server_url
    }

    /// Canonical public URL of the manifest.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn catalog_key(&self) -> &str {
        &self.catalog_key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    /// Rights statement URI.
    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn related(&self) -> Option<&str> {
        self.related.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn master_files(&self) -> &[MasterFile] {
        &self.master_files
    }

    pub fn start_page(&self) -> usize {
        self.start_page
    }

    pub fn exemplar_pid(&self) -> &str {
        &self.exemplar_pid
    }

    pub fn exemplar_rotation(&self) -> Option<Rotation> {
        self.exemplar_rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("flip_y_axis"), "!0")]
    #[case(Some("rotate90"), "90")]
    #[case(Some("rotate180"), "180")]
    #[case(Some("rotate270"), "270")]
    #[case(Some("normal"), "0")]
    #[case(Some(""), "0")]
    #[case(None, "0")]
    fn test_rotation(#[case] orientation: Option<&str>, #[case] expected: &str) {
        assert_eq!(Rotation::from_orientation(orientation).as_str(), expected);
    }

    #[test]
    fn test_metadata_overwrites_in_place() {
        let mut metadata = Metadata::default();
        metadata.set(Metadata::AUTHOR, "A");
        metadata.set(Metadata::FORMAT, "Book");
        metadata.set(Metadata::AUTHOR, "B");
        assert_eq!(metadata.iter().count(), 2);
        let entries: Vec<_> = metadata.iter().map(|e| (e.name, e.value.as_str())).collect();
        assert_eq!(entries, [("Author", "B"), ("Format", "Book")]);
    }

    #[test]
    fn test_metadata_serializes_as_ordered_pairs() {
        let mut metadata = Metadata::default();
        metadata.set(Metadata::DATE, "1820");
        metadata.set(Metadata::CALL_NUMBER, "MSS 1");
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"name": "Date", "value": "1820"},
                {"name": "Call Number", "value": "MSS 1"},
            ])
        );
    }
}

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Deserializer};

/// The master file a page was cloned from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CloneSource {
    #[serde(default)]
    pub pid: String,
    #[serde(default)]
    pub filename: String,
}

/// One page (master file) as reported by an upstream page-list source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageRecord {
    pub pid: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "dimension")]
    pub width: u32,
    #[serde(default, deserialize_with = "dimension")]
    pub height: u32,
    /// Orientation keyword, e.g. `rotate90` or `flip_y_axis`.
    #[serde(default)]
    pub orientation: Option<String>,
    /// Whether the upstream flagged this page as the exemplar.
    #[serde(default)]
    pub exemplar: Option<bool>,
    #[serde(default)]
    pub cloned_from: Option<CloneSource>,
    /// Embedded MODS document describing the page, when the source has one.
    #[serde(skip)]
    pub descriptive: Option<String>,
}

/// Missing or `null` dimensions read as zero.
fn dimension<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    Option::<u32>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl PageRecord {
    /// Decode the JSON array returned by the TrackSys manifest endpoint.
    pub fn list_from_json(payload: impl AsRef<[u8]>) -> Result<Vec<Self>> {
        serde_json::from_slice(payload.as_ref()).or_raise(|| ErrorKind::MalformedJson("page list"))
    }

    /// Identifier and filename of the image to display for this page.
    ///
    /// Pages cloned from another master file point at the original image,
    /// so the source identifier is used instead of the page's own.
    pub fn image(&self) -> (&str, &str) {
        match &self.cloned_from {
            Some(source) if !source.pid.is_empty() => (source.pid.as_str(), source.filename.as_str()),
            _ => (self.pid.as_str(), self.filename.as_str()),
        }
    }

    pub fn is_exemplar(&self) -> bool {
        self.exemplar.unwrap_or(false)
    }
}

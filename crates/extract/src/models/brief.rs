use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Deserialize;

/// Flat descriptive record for a single metadata item.
///
/// Returned by the TrackSys brief-metadata endpoint, and also assembled from
/// the relational `metadata` table when running against the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefMetadata {
    pub title: String,
    #[serde(default)]
    pub creator: Option<String>,
    /// Rights statement URI.
    #[serde(default)]
    pub rights: Option<String>,
    #[serde(default)]
    pub call_number: Option<String>,
    #[serde(default)]
    pub catalog_key: Option<String>,
    /// Filename of the exemplar (thumbnail) page.
    #[serde(default)]
    pub exemplar: Option<String>,
    /// Content advisory text, shown by viewers before the images.
    #[serde(default)]
    pub advisory: Option<String>,
}
impl BriefMetadata {
    pub fn from_json(payload: impl AsRef<[u8]>) -> Result<Self> {
        serde_json::from_slice(payload.as_ref()).or_raise(|| ErrorKind::MalformedJson("brief metadata"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_brief_metadata() {
        let payload = r#"{
            "pid": "uva-lib:2528443",
            "title": "Walking tour of Charlottesville",
            "creator": "Holsinger, Rufus W.",
            "rights": "http://rightsstatements.org/vocab/InC-EDU/1.0/",
            "callNumber": "MSS 9862",
            "catalogKey": "u2528443",
            "exemplar": "000012345_0001.tif"
        }"#;
        let brief = BriefMetadata::from_json(payload).unwrap();
        assert_eq!(brief.title, "Walking tour of Charlottesville");
        assert_eq!(brief.creator.as_deref(), Some("Holsinger, Rufus W."));
        assert_eq!(brief.call_number.as_deref(), Some("MSS 9862"));
        assert_eq!(brief.catalog_key.as_deref(), Some("u2528443"));
        assert_eq!(brief.exemplar.as_deref(), Some("000012345_0001.tif"));
        assert_eq!(brief.advisory, None);
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let err = BriefMetadata::from_json(r#"{"creator": "Nobody"}"#).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedJson("brief metadata"));
    }

    #[test]
    fn test_null_optionals() {
        let brief = BriefMetadata::from_json(r#"{"title": "T", "creator": null, "rights": null}"#).unwrap();
        assert_eq!(brief.creator, None);
        assert_eq!(brief.rights, None);
    }
}

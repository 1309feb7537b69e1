//! MODS descriptive records.

use super::Element;
use crate::error::Result;

/// Title and description overrides read from a MODS record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptive {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Descriptive {
    /// Read the title and description out of a MODS document.
    ///
    /// The description prefers an abstract labelled `Description`; failing
    /// that, a staff provenance note is used with a `Staff note: ` prefix.
    pub fn from_mods(xml: &str) -> Result<Self> {
        let root = Element::parse(xml, "MODS")?;
        let Some(mods) = root.find("mods") else {
            return Ok(Self::default());
        };
        let title = mods
            .children_named("titleInfo")
            .flat_map(|info| info.children_named("title"))
            .map(Element::text)
            .find(|t| !t.is_empty());
        let description = mods
            .children_named("abstract")
            .find(|a| a.attr("displayLabel") == Some("Description"))
            .map(Element::text)
            .filter(|t| !t.is_empty())
            .or_else(|| {
                mods.children_named("note")
                    .find(|n| n.attr("type") == Some("provenance") && n.attr("displayLabel") == Some("staff"))
                    .map(Element::text)
                    .filter(|t| !t.is_empty())
                    .map(|note| format!("Staff note: {note}"))
            });
        Ok(Self { title, description })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_title_and_abstract() {
        let mods = r#"<?xml version="1.0" encoding="UTF-8"?>
            <mods xmlns="http://www.loc.gov/mods/v3">
                <titleInfo><title>Letter to Thomas Jefferson</title></titleInfo>
                <abstract displayLabel="Summary">Ignored</abstract>
                <abstract displayLabel="Description">Two pages, signed.</abstract>
            </mods>"#;
        let descriptive = Descriptive::from_mods(mods).unwrap();
        assert_eq!(descriptive.title.as_deref(), Some("Letter to Thomas Jefferson"));
        assert_eq!(descriptive.description.as_deref(), Some("Two pages, signed."));
    }

    #[test]
    fn test_staff_note_fallback() {
        let mods = r#"<mods:modsCollection xmlns:mods="http://www.loc.gov/mods/v3"><mods:mods>
                <mods:note type="provenance" displayLabel="staff">Digitized from microfilm</mods:note>
            </mods:mods></mods:modsCollection>"#;
        let descriptive = Descriptive::from_mods(mods).unwrap();
        assert_eq!(descriptive.title, None);
        assert_eq!(descriptive.description.as_deref(), Some("Staff note: Digitized from microfilm"));
    }

    #[test]
    fn test_public_note_is_not_a_description() {
        let mods = r#"<mods><note type="provenance">Public</note></mods>"#;
        assert!(Descriptive::from_mods(mods).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_mods() {
        let err = Descriptive::from_mods("<mods><titleInfo></mods>").unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedXml("MODS"));
    }
}

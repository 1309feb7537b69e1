//! MARC21 slim records embedded in catalog index documents.

use super::Element;
use crate::error::Result;

/// Physical description (field 300) of a MARCXML record.
///
/// Subfields are joined with single spaces, e.g. `1 v. (12 p.) ; 23 cm.`.
/// Returns `None` when the record has no 300 field.
pub fn physical_description(marc: &str) -> Result<Option<String>> {
    let root = Element::parse(marc, "MARC")?;
    let Some(record) = root.find("record") else {
        return Ok(None);
    };
    let Some(field) = record.children_named("datafield").find(|f| f.attr("tag") == Some("300")) else {
        return Ok(None);
    };
    let description = field
        .children_named("subfield")
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Some(description).filter(|d| !d.is_empty()))
}

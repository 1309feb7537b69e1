//! Solr index records.
//!
//! Two shapes are understood. Catalog search responses wrap each field as
//! `<arr name="..."><str>value</str></arr>` or `<str name="...">`, while the
//! repository index emits update documents with `<field name="...">`. Both
//! are flattened into `(name, values)` pairs before fields are picked out.

use super::{Element, physical_description};
use crate::error::Result;
use crate::models::IndexFields;

const FORMAT_EXCLUDED: &str = "Online";

#[derive(Debug, Default)]
struct SolrDocument {
    fields: Vec<(String, Vec<String>)>,
}

impl SolrDocument {
    fn parse(xml: &str, what: &'static str) -> Result<Self> {
        let root = Element::parse(xml, what)?;
        let Some(doc) = root.find("doc") else {
            // No hits.
            return Ok(Self::default());
        };
        let mut fields: Vec<(String, Vec<String>)> = Vec::new();
        for child in doc.children() {
            let Some(name) = child.attr("name") else { continue };
            let values = match child.name() {
                "arr" => child.children().map(Element::text).collect(),
                _ => vec![child.text()],
            };
            let values = values.into_iter().filter(|v: &String| !v.is_empty());
            match fields.iter().position(|(n, _)| n == name) {
                Some(index) => fields[index].1.extend(values),
                None => fields.push((name.to_string(), values.collect())),
            }
        }
        Ok(Self { fields })
    }

    fn values(&self, name: &str) -> &[String] {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_slice()).unwrap_or_default()
    }

    fn first(&self, name: &str) -> Option<String> {
        self.values(name).first().cloned()
    }

    fn joined(&self, name: &str, separator: &str) -> Option<String> {
        Some(self.values(name).join(separator)).filter(|v| !v.is_empty())
    }

    fn format(&self) -> Option<String> {
        let formats: Vec<&str> =
            self.values("format_facet").iter().map(String::as_str).filter(|f| *f != FORMAT_EXCLUDED).collect();
        Some(formats.join("; ")).filter(|f| !f.is_empty())
    }
}

impl IndexFields {
    /// Fields from a library catalog search response.
    ///
    /// The physical description is read from the embedded MARC record; a
    /// MARC record that cannot be parsed is logged and skipped rather than
    /// failing the whole record.
    pub fn from_catalog_record(xml: &str) -> Result<Self> {
        let doc = SolrDocument::parse(xml, "catalog index")?;
        let physical_description = match doc.first("marc_display") {
            Some(marc) => physical_description(&marc).unwrap_or_else(|err| {
                tracing::warn!(target: "iiifman::extract", error = %err, "skipping unparseable MARC record");
                None
            }),
            None => None,
        };
        Ok(Self {
            format: doc.format(),
            physical_description,
            date: doc.joined("published_date_display", ", ").or_else(|| doc.first("year_display")),
            author: None,
            call_number: doc.first("call_number_display"),
        })
    }

    /// Fields from a repository index update document.
    pub fn from_repository_record(xml: &str) -> Result<Self> {
        let doc = SolrDocument::parse(xml, "repository index")?;
        Ok(Self {
            format: doc.format(),
            physical_description: None,
            date: doc.first("year_display").or_else(|| doc.joined("published_date_display", ", ")),
            author: doc.first("author_display"),
            call_number: doc.first("call_number_display"),
        })
    }
}

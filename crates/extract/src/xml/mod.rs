//! XML extraction.
//!
//! Documents are small (a single MODS record, a single Solr response), so
//! they are read into a lightweight element tree with `quick-xml` and
//! queried by local name. Namespace prefixes are ignored: MODS and MARC
//! records show up both with and without them.

mod marc;
mod mods;
mod solr;

pub use self::marc::physical_description;
pub use self::mods::Descriptive;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

#[derive(Debug, Default)]
pub(crate) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Parse a document and return its root element.
    pub(crate) fn parse(xml: &str, what: &'static str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;
        loop {
            match reader.read_event().or_raise(|| ErrorKind::MalformedXml(what))? {
                Event::Start(start) => stack.push(Self::open(&start, what)?),
                Event::Empty(start) => {
                    let element = Self::open(&start, what)?;
                    Self::close(&mut stack, &mut root, element);
                },
                Event::End(_) => {
                    let element = stack.pop().ok_or_raise(|| ErrorKind::MalformedXml(what))?;
                    Self::close(&mut stack, &mut root, element);
                },
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&text.unescape().or_raise(|| ErrorKind::MalformedXml(what))?);
                    }
                },
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&String::from_utf8_lossy(&data.into_inner()));
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }
        if !stack.is_empty() {
            exn::bail!(ErrorKind::MalformedXml(what));
        }
        root.ok_or_raise(|| ErrorKind::MalformedXml(what))
    }

    fn open(start: &BytesStart, what: &'static str) -> Result<Self> {
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.or_raise(|| ErrorKind::MalformedXml(what))?;
            let value = attribute.unescape_value().or_raise(|| ErrorKind::MalformedXml(what))?;
            attributes.push((
                String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned(),
                value.into_owned(),
            ));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            ..Self::default()
        })
    }

    fn close(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            // Only the first root counts; anything after it is trailing junk.
            None => {
                root.get_or_insert(element);
            },
        }
    }

    fn push_text(&mut self, text: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    pub(crate) fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth-first search for the first element (including `self`) with the given name.
    pub(crate) fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// All text inside this element, descendants included, whitespace-normalised.
    pub(crate) fn text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if !self.text.is_empty() {
            parts.push(&self.text);
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let root = Element::parse(r#"<a x="1"><b>one</b><b>two &amp; three</b><c/></a>"#, "test").unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.attr("x"), Some("1"));
        let texts: Vec<_> = root.children_named("b").map(Element::text).collect();
        assert_eq!(texts, vec!["one", "two & three"]);
        assert!(root.find("c").is_some());
    }

    #[test]
    fn test_namespace_prefixes_are_ignored() {
        let root = Element::parse(
            r#"<mods:mods xmlns:mods="http://www.loc.gov/mods/v3"><mods:titleInfo/></mods:mods>"#,
            "test",
        )
        .unwrap();
        assert_eq!(root.name(), "mods");
        assert!(root.find("titleInfo").is_some());
    }

    #[test]
    fn test_nested_text_is_joined() {
        let root = Element::parse("<p>Hello <i>wide\n   world</i></p>", "test").unwrap();
        assert_eq!(root.text(), "Hello wide world");
    }

    #[test]
    fn test_cdata() {
        let root = Element::parse("<p><![CDATA[<b>raw</b>]]></p>", "test").unwrap();
        assert_eq!(root.text(), "<b>raw</b>");
    }

    #[test]
    fn test_malformed() {
        assert_eq!(*Element::parse("<a><b></a>", "test").unwrap_err(), ErrorKind::MalformedXml("test"));
        assert_eq!(*Element::parse("<a>", "test").unwrap_err(), ErrorKind::MalformedXml("test"));
        assert_eq!(*Element::parse("", "test").unwrap_err(), ErrorKind::MalformedXml("test"));
    }
}

use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use iiifman_extract::{BriefMetadata, PageRecord};

/// The table a PID was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Metadata,
    Component,
}

/// Which of a metadata record's pages to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFilter {
    /// Only pages of the given unit, whether or not it is published.
    Unit(u32),
    /// Every page of every unit.
    All,
    /// Pages of units flagged for inclusion in the digital library.
    DigitalLibrary,
}
impl PageFilter {
    /// An explicit unit always wins; external records otherwise show
    /// everything, and all other records only their published units.
    pub fn select(unit: Option<u32>, external: bool) -> Self {
        match (unit, external) {
            (Some(unit), _) => Self::Unit(unit),
            (None, true) => Self::All,
            (None, false) => Self::DigitalLibrary,
        }
    }
}

/// A row of the `metadata` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub id: i64,
    /// Record type as stored, e.g. `SirsiMetadata` or `XmlMetadata`.
    pub kind: String,
    pub brief: BriefMetadata,
    /// Embedded MODS document, for XML records.
    pub descriptive: Option<String>,
}

/// A row of the `components` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    pub id: i64,
    pub title: String,
    /// Filename of the exemplar page.
    pub exemplar: Option<String>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct CountRow {
    pub(crate) matches: i64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct MetadataRow {
    pub(crate) id: i64,
    pub(crate) title: Option<String>,
    pub(crate) creator_name: Option<String>,
    pub(crate) catalog_key: Option<String>,
    pub(crate) call_number: Option<String>,
    pub(crate) exemplar: Option<String>,
    pub(crate) kind: String,
    pub(crate) desc_metadata: Option<String>,
    pub(crate) rights: Option<String>,
}
impl From<MetadataRow> for MetadataRecord {
    fn from(row: MetadataRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            brief: BriefMetadata {
                title: row.title.unwrap_or_default(),
                creator: non_empty(row.creator_name),
                rights: non_empty(row.rights),
                call_number: non_empty(row.call_number),
                catalog_key: non_empty(row.catalog_key),
                exemplar: non_empty(row.exemplar),
                advisory: None,
            },
            descriptive: non_empty(row.desc_metadata),
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ComponentRow {
    pub(crate) id: i64,
    pub(crate) title: Option<String>,
    pub(crate) exemplar: Option<String>,
}
impl From<ComponentRow> for ComponentRecord {
    fn from(row: ComponentRow) -> Self {
        Self { id: row.id, title: row.title.unwrap_or_default(), exemplar: non_empty(row.exemplar) }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PageRow {
    pub(crate) pid: String,
    pub(crate) filename: String,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    #[sqlx(default)]
    pub(crate) desc_metadata: Option<String>,
    pub(crate) width: i64,
    pub(crate) height: i64,
}
impl TryFrom<PageRow> for PageRecord {
    type Error = Error;
    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            width: u32::try_from(row.width).or_raise(|| ErrorKind::InvalidData("width"))?,
            height: u32::try_from(row.height).or_raise(|| ErrorKind::InvalidData("height"))?,
            pid: row.pid,
            filename: row.filename,
            title: non_empty(row.title),
            description: non_empty(row.description),
            descriptive: non_empty(row.desc_metadata),
            ..Self::default()
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

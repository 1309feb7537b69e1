/// Fields read from a search index record to enrich a manifest.
///
/// Every field is optional; an index record that knows nothing useful
/// simply leaves the manifest as the primary source described it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexFields {
    /// Format facets, joined with `"; "`.
    pub format: Option<String>,
    pub physical_description: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub call_number: Option<String>,
}
impl IndexFields {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

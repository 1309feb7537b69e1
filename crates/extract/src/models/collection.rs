use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use serde::Deserialize;

/// Descriptive record for an item held in the archival collection system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionMetadata {
    pub title: String,
    pub catalog_key: Option<String>,
    pub call_number: Option<String>,
    /// Rights statement URI.
    pub rights: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemTree {
    #[serde(default)]
    collection: Option<Node>,
    item: Node,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(default, rename = "type")]
    kind: Option<NodeType>,
    #[serde(default)]
    value: String,
    #[serde(default, rename = "valueURI")]
    value_uri: Option<String>,
    #[serde(default)]
    children: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct NodeType {
    name: String,
}

impl Node {
    fn name(&self) -> Option<&str> {
        self.kind.as_ref().map(|t| t.name.as_str())
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name() == Some(name))
    }

    fn child_value(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.value.trim().to_string()).filter(|v| !v.is_empty())
    }
}

impl CollectionMetadata {
    /// Decode an item tree from the collection system.
    ///
    /// Base fields come from the enclosing collection node. When the item
    /// has its own title it is appended to the collection title, so that a
    /// folder inside a collection reads `Collection: Folder`. When the
    /// requested item *is* the collection, only its own fields are used.
    pub fn from_json(payload: impl AsRef<[u8]>) -> Result<Self> {
        let tree: ItemTree =
            serde_json::from_slice(payload.as_ref()).or_raise(|| ErrorKind::MalformedJson("collection item"))?;
        let base = tree.collection.as_ref().unwrap_or(&tree.item);
        let mut title = base.child_value("title").ok_or_raise(|| ErrorKind::MissingField("title"))?;
        if tree.collection.is_some()
            && let Some(item_title) = tree.item.child_value("title")
        {
            title = format!("{title}: {item_title}");
        }
        Ok(Self {
            title,
            catalog_key: base.child_value("catalogKey"),
            call_number: base.child_value("callNumber"),
            rights: base.child("useRights").and_then(|c| c.value_uri.clone()).filter(|v| !v.is_empty()),
        })
    }
}

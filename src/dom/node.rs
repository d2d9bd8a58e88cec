//! The DOM node sum type: `Root`, `Tag`, `Attr`, `Text`, `Json`.

use ego_tree::{NodeId, Tree};

use crate::json::JsonValue;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Root,
    Tag(String),
    Attr { key: String, val: Option<String> },
    Text(String),
    Json(JsonValue),
}

impl NodeData {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeData::Root => "root",
            NodeData::Tag(_) => "tag",
            NodeData::Attr { .. } => "attr",
            NodeData::Text(_) => "text",
            NodeData::Json(_) => "json",
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self {
            NodeData::Tag(name) => Some(name),
            _ => None,
        }
    }
}

/// A parsed HVML document: an [`ego_tree::Tree`] rooted at `NodeData::Root`,
/// plus the insertion-order index ([`crate::dom::doc_order`]) callers need
/// for XPath document-order sorting.
#[derive(Debug)]
pub struct Dom {
    pub tree: Tree<NodeData>,
}

impl Dom {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(NodeData::Root),
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

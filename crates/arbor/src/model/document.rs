//! Detached node subtrees.

use serde::{Deserialize, Serialize};

use super::kind::{FieldMap, NodeKind};
use crate::error::TreeResult;

/// A detached, serializable copy of a node and its whole subtree.
///
/// Documents are what travels through the clipboard and drag-drop payloads,
/// and what [`SourceTree::insert_document`](super::SourceTree::insert_document)
/// materializes back into a tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeDocument {
    /// The node kind.
    pub kind: NodeKind,
    /// The node name.
    pub name: String,
    /// Kind-specific payload.
    #[serde(default, skip_serializing_if = "FieldMap::is_empty")]
    pub fields: FieldMap,
    /// Child documents, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDocument>,
}

impl NodeDocument {
    /// Create a document with no fields or children.
    pub fn new(kind: impl Into<NodeKind>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            fields: FieldMap::new(),
            children: Vec::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: NodeDocument) -> Self {
        self.children.push(child);
        self
    }

    /// Find a direct child by name.
    pub fn child(&self, name: &str) -> Option<&NodeDocument> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Number of nodes in this document, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// The first name that appears twice among the children of some node.
    pub fn duplicate_sibling_name(&self) -> Option<&str> {
        for (i, child) in self.children.iter().enumerate() {
            if self.children[..i].iter().any(|c| c.name == child.name) {
                return Some(&child.name);
            }
        }
        self.children.iter().find_map(Self::duplicate_sibling_name)
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> TreeResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(bytes: &[u8]) -> TreeResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

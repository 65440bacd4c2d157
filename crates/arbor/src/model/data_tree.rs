//! An arena-backed source tree.
//!
//! [`DataTree`] is the stock [`SourceTree`]: nodes live in a slotmap arena
//! addressed by [`NodeId`], each with a name that is unique among its
//! siblings, a [`NodeKind`] and a JSON field map. Two fields have meaning to
//! the tree view: [`LABEL_FIELD`] supplies a display label and
//! [`READ_ONLY_FIELD`] marks a node read-only.

use serde_json::Value;
use slotmap::{SlotMap, new_key_type};

use arbor_core::logging::{DebugTree, TreeFormatter, targets};

use super::document::NodeDocument;
use super::kind::{FieldMap, KindRegistry, NodeKind};
use super::source::SourceTree;
use crate::error::{TreeError, TreeResult};

/// Field holding a node's display label.
pub const LABEL_FIELD: &str = "label";

/// Field marking a node read-only.
pub const READ_ONLY_FIELD: &str = "read_only";

new_key_type! {
    /// Handle to a node in a [`DataTree`].
    pub struct NodeId;
}

#[derive(Debug, Clone)]
struct DataNode {
    name: String,
    kind: NodeKind,
    fields: FieldMap,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A tree of named, typed nodes with JSON fields.
#[derive(Debug, Clone)]
pub struct DataTree {
    nodes: SlotMap<NodeId, DataNode>,
    root: NodeId,
    registry: Option<KindRegistry>,
}

impl DataTree {
    /// Create a tree holding only a root node.
    pub fn new(root_kind: impl Into<NodeKind>, root_name: impl Into<String>) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(DataNode {
            name: root_name.into(),
            kind: root_kind.into(),
            fields: FieldMap::new(),
            parent: None,
            children: Vec::new(),
        });
        Self {
            nodes,
            root,
            registry: None,
        }
    }

    /// Create a tree whose node kinds are checked against `registry`.
    ///
    /// New nodes get their default fields from the registry's constructors.
    pub fn with_registry(
        registry: KindRegistry,
        root_kind: impl Into<NodeKind>,
        root_name: impl Into<String>,
    ) -> TreeResult<Self> {
        let root_kind = root_kind.into();
        let fields = registry.construct(&root_kind)?;
        let mut tree = Self::new(root_kind, root_name);
        tree.nodes[tree.root].fields = fields;
        tree.registry = Some(registry);
        Ok(tree)
    }

    /// Build a tree from a document. The document becomes the root.
    pub fn from_document(doc: &NodeDocument) -> TreeResult<Self> {
        if let Some(name) = doc.duplicate_sibling_name() {
            return Err(TreeError::name_conflict(name));
        }
        let mut tree = Self::new(doc.kind.clone(), doc.name.clone());
        tree.nodes[tree.root].fields = doc.fields.clone();
        let root = tree.root;
        for (i, child) in doc.children.iter().enumerate() {
            tree.build(root, i, child);
        }
        Ok(tree)
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The kind registry, if the tree has one.
    pub fn registry(&self) -> Option<&KindRegistry> {
        self.registry.as_ref()
    }

    /// Append a new child of `kind` to `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: impl Into<NodeKind>,
        name: &str,
    ) -> TreeResult<NodeId> {
        let index = self.children(parent).len();
        self.insert_new_child(parent, &kind.into(), index, name)
    }

    /// All fields of a node.
    pub fn fields(&self, id: NodeId) -> Option<&FieldMap> {
        self.nodes.get(id).map(|n| &n.fields)
    }

    /// A single field of a node.
    pub fn field(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.nodes.get(id)?.fields.get(key)
    }

    /// Set a field on a node.
    pub fn set_field(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> TreeResult<()> {
        let node = self.nodes.get_mut(id).ok_or(TreeError::InvalidNode)?;
        node.fields.insert(key.into(), value.into());
        Ok(())
    }

    /// Mark a node read-only, or clear the mark.
    pub fn set_read_only(&mut self, id: NodeId, read_only: bool) -> TreeResult<()> {
        self.set_field(id, READ_ONLY_FIELD, read_only)
    }

    /// Node IDs of the subtree at `id` in pre-order.
    pub fn depth_first_preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.nodes.contains_key(id) {
            let mut stack = vec![id];
            while let Some(current) = stack.pop() {
                out.push(current);
                stack.extend(self.nodes[current].children.iter().rev());
            }
        }
        out
    }

    /// Render the subtree at `id` for debugging.
    pub fn dump(&self, id: NodeId) -> String {
        TreeFormatter::new().format_subtree(self, id)
    }

    fn check_kind(&self, kind: &NodeKind) -> TreeResult<FieldMap> {
        match &self.registry {
            Some(registry) => registry.construct(kind),
            None => Ok(FieldMap::new()),
        }
    }

    fn check_document_kinds(&self, doc: &NodeDocument) -> TreeResult<()> {
        if let Some(registry) = &self.registry
            && !registry.contains(&doc.kind)
        {
            return Err(TreeError::unknown_kind(doc.kind.as_str()));
        }
        doc.children
            .iter()
            .try_for_each(|c| self.check_document_kinds(c))
    }

    fn check_free_name(&self, parent: NodeId, name: &str, except: Option<NodeId>) -> TreeResult<()> {
        let taken = self.nodes[parent]
            .children
            .iter()
            .any(|&c| Some(c) != except && self.nodes[c].name == name);
        if taken {
            return Err(TreeError::name_conflict(name));
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, index: usize, node: DataNode) -> NodeId {
        let id = self.nodes.insert(node);
        let children = &mut self.nodes[parent].children;
        let index = index.min(children.len());
        children.insert(index, id);
        id
    }

    // Callers validate names and kinds first, so this cannot fail halfway.
    fn build(&mut self, parent: NodeId, index: usize, doc: &NodeDocument) -> NodeId {
        let id = self.attach(
            parent,
            index,
            DataNode {
                name: doc.name.clone(),
                kind: doc.kind.clone(),
                fields: doc.fields.clone(),
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        for (i, child) in doc.children.iter().enumerate() {
            self.build(id, i, child);
        }
        id
    }

    fn remove_subtree(&mut self, id: NodeId) {
        for node in self.depth_first_preorder(id) {
            self.nodes.remove(node);
        }
    }

    fn document(&self, id: NodeId) -> NodeDocument {
        let node = &self.nodes[id];
        NodeDocument {
            kind: node.kind.clone(),
            name: node.name.clone(),
            fields: node.fields.clone(),
            children: node.children.iter().map(|&c| self.document(c)).collect(),
        }
    }
}

impl SourceTree for DataTree {
    type Id = NodeId;

    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    fn set_name(&mut self, id: NodeId, name: &str) -> TreeResult<()> {
        let parent = self.nodes.get(id).ok_or(TreeError::InvalidNode)?.parent;
        if let Some(parent) = parent {
            self.check_free_name(parent, name, Some(id))?;
        }
        self.nodes[id].name = name.to_string();
        Ok(())
    }

    fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|n| &n.kind)
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    #[tracing::instrument(skip(self), target = "arbor::source", level = "trace")]
    fn insert_new_child(
        &mut self,
        parent: NodeId,
        kind: &NodeKind,
        index: usize,
        name: &str,
    ) -> TreeResult<NodeId> {
        if !self.contains(parent) {
            return Err(TreeError::InvalidNode);
        }
        self.check_free_name(parent, name, None)?;
        let fields = self.check_kind(kind)?;
        Ok(self.attach(
            parent,
            index,
            DataNode {
                name: name.to_string(),
                kind: kind.clone(),
                fields,
                parent: Some(parent),
                children: Vec::new(),
            },
        ))
    }

    fn insert_document(
        &mut self,
        parent: NodeId,
        index: usize,
        doc: &NodeDocument,
    ) -> TreeResult<NodeId> {
        if !self.contains(parent) {
            return Err(TreeError::InvalidNode);
        }
        self.check_free_name(parent, &doc.name, None)?;
        if let Some(name) = doc.duplicate_sibling_name() {
            return Err(TreeError::name_conflict(name));
        }
        self.check_document_kinds(doc)?;
        tracing::trace!(
            target: targets::SOURCE,
            name = %doc.name,
            nodes = doc.node_count(),
            "inserting document"
        );
        Ok(self.build(parent, index, doc))
    }

    fn delete(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.nodes.get(id).ok_or(TreeError::InvalidNode)?;
        let parent = node.parent.ok_or(TreeError::RootNode { action: "delete" })?;
        self.nodes[parent].children.retain(|&c| c != id);
        self.remove_subtree(id);
        tracing::trace!(target: targets::SOURCE, ?id, "deleted node");
        Ok(())
    }

    fn to_document(&self, id: NodeId) -> TreeResult<NodeDocument> {
        if !self.contains(id) {
            return Err(TreeError::InvalidNode);
        }
        Ok(self.document(id))
    }

    fn copy_from(&mut self, id: NodeId, doc: &NodeDocument) -> TreeResult<()> {
        if !self.contains(id) {
            return Err(TreeError::InvalidNode);
        }
        if let Some(name) = doc.duplicate_sibling_name() {
            return Err(TreeError::name_conflict(name));
        }
        self.check_document_kinds(doc)?;

        let old_children = std::mem::take(&mut self.nodes[id].children);
        for child in old_children {
            self.remove_subtree(child);
        }
        let node = &mut self.nodes[id];
        node.kind = doc.kind.clone();
        node.fields = doc.fields.clone();
        for (i, child) in doc.children.iter().enumerate() {
            self.build(id, i, child);
        }
        Ok(())
    }

    fn label(&self, id: NodeId) -> Option<String> {
        match self.field(id, LABEL_FIELD)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    fn is_read_only(&self, id: NodeId) -> bool {
        matches!(self.field(id, READ_ONLY_FIELD), Some(Value::Bool(true)))
    }
}

impl DebugTree for DataTree {
    type Id = NodeId;

    fn debug_name(&self, id: NodeId) -> Option<String> {
        self.nodes.get(id).map(|n| n.name.clone())
    }

    fn debug_kind(&self, id: NodeId) -> Option<String> {
        self.nodes.get(id).map(|n| n.kind.to_string())
    }

    fn debug_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).to_vec()
    }

    fn debug_detail(&self, id: NodeId) -> Option<String> {
        let fields = &self.nodes.get(id)?.fields;
        if fields.is_empty() {
            return None;
        }
        Some(fields.keys().cloned().collect::<Vec<_>>().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `{A: [B: [D], C]}` under a root named "root".
    fn setup() -> (DataTree, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = DataTree::new("Group", "root");
        let root = tree.root();
        let a = tree.add_child(root, "Group", "A").unwrap();
        let b = tree.add_child(a, "Item", "B").unwrap();
        let c = tree.add_child(a, "Item", "C").unwrap();
        let d = tree.add_child(b, "Item", "D").unwrap();
        (tree, a, b, c, d)
    }

    #[test]
    fn test_structure() {
        let (tree, a, b, c, d) = setup();
        assert_eq!(tree.children(a), &[b, c]);
        assert_eq!(tree.parent(d), Some(b));
        assert_eq!(tree.index_in_parent(c), Some(1));
        assert_eq!(tree.index_in_parent(tree.root()), None);
        assert!(tree.has_children(b));
        assert!(!tree.has_children(c));
        assert_eq!(tree.child_by_name(a, "C"), Some(c));
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_sibling_names_unique() {
        let (mut tree, a, b, c, _) = setup();
        let err = tree.add_child(a, "Item", "B").unwrap_err();
        assert!(matches!(err, TreeError::NameConflict { .. }));
        assert!(tree.set_name(c, "B").is_err());
        // Renaming to its own name is fine.
        tree.set_name(b, "B").unwrap();
        tree.set_name(c, "E").unwrap();
        assert_eq!(tree.name(c), Some("E"));
    }

    #[test]
    fn test_path_from_and_find_path() {
        let (tree, a, b, _, d) = setup();
        let root = tree.root();
        assert_eq!(tree.path_from(root, d).unwrap(), "A/B/D");
        assert_eq!(tree.path_from(a, d).unwrap(), "B/D");
        assert_eq!(tree.path_from(root, root).unwrap(), "");
        assert!(matches!(
            tree.path_from(b, a),
            Err(TreeError::NotDescendant)
        ));

        assert_eq!(tree.find_path(root, "A/B/D").unwrap(), d);
        assert_eq!(tree.find_path(root, "").unwrap(), root);
        assert!(matches!(
            tree.find_path(root, "A/X"),
            Err(TreeError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_path_with_separator_in_name() {
        let mut tree = DataTree::new("Group", "root");
        let root = tree.root();
        let odd = tree.add_child(root, "Item", "x/y").unwrap();
        let path = tree.path_from(root, odd).unwrap();
        assert_eq!(path, r"x\/y");
        assert_eq!(tree.find_path(root, &path).unwrap(), odd);
    }

    #[test]
    fn test_delete_removes_subtree() {
        let (mut tree, a, b, c, d) = setup();
        tree.delete(b).unwrap();
        assert!(!tree.contains(b));
        assert!(!tree.contains(d));
        assert_eq!(tree.children(a), &[c]);
        assert!(matches!(tree.delete(b), Err(TreeError::InvalidNode)));
        assert!(matches!(
            tree.delete(tree.root()),
            Err(TreeError::RootNode { .. })
        ));
    }

    #[test]
    fn test_document_round_trip() {
        let (mut tree, a, b, _, _) = setup();
        tree.set_field(b, "weight", 3).unwrap();
        let doc = tree.to_document(a).unwrap();
        assert_eq!(doc.node_count(), 4);

        let rebuilt = DataTree::from_document(&doc).unwrap();
        assert_eq!(rebuilt.to_document(rebuilt.root()).unwrap(), doc);
    }

    #[test]
    fn test_clone_node() {
        let (mut tree, a, b, c, _) = setup();
        let copy = tree.clone_node(b, a, 1, "B_Copy").unwrap();
        assert_eq!(tree.children(a), &[b, copy, c]);
        assert_eq!(tree.children(copy).len(), 1);
        assert_ne!(tree.children(copy)[0], tree.children(b)[0]);
    }

    #[test]
    fn test_insert_document_validates_first() {
        let (mut tree, a, _, _, _) = setup();
        let bad = NodeDocument::new("Group", "N")
            .with_child(NodeDocument::new("Item", "x"))
            .with_child(NodeDocument::new("Item", "x"));
        let before = tree.node_count();
        assert!(tree.insert_document(a, 0, &bad).is_err());
        assert_eq!(tree.node_count(), before);

        // Index past the end appends.
        let ok = tree.insert_document(a, 99, &NodeDocument::new("Item", "Z")).unwrap();
        assert_eq!(tree.index_in_parent(ok), Some(2));
    }

    #[test]
    fn test_copy_from_keeps_name() {
        let (mut tree, a, b, _, d) = setup();
        let doc = NodeDocument::new("Shape", "ignored")
            .with_field("color", "red")
            .with_child(NodeDocument::new("Item", "E"));
        tree.copy_from(b, &doc).unwrap();

        assert_eq!(tree.name(b), Some("B"));
        assert_eq!(tree.kind(b).map(NodeKind::as_str), Some("Shape"));
        assert_eq!(tree.field(b, "color"), Some(&Value::from("red")));
        assert!(!tree.contains(d));
        assert_eq!(tree.children(b).len(), 1);
        assert_eq!(tree.index_in_parent(b), Some(0));
        assert_eq!(tree.children(a).len(), 2);
    }

    #[test]
    fn test_label_and_read_only() {
        let (mut tree, a, b, _, _) = setup();
        assert_eq!(tree.label(a), None);
        tree.set_field(a, LABEL_FIELD, "Layer A").unwrap();
        assert_eq!(tree.label(a).as_deref(), Some("Layer A"));

        assert!(!tree.is_read_only(b));
        tree.set_read_only(b, true).unwrap();
        assert!(tree.is_read_only(b));
    }

    #[test]
    fn test_registry_enforced() {
        let mut registry = KindRegistry::new();
        let node = NodeKind::new("Node");
        registry.register(node.clone(), None).unwrap();
        registry
            .register_with("Circle", Some(&node), || {
                let mut f = FieldMap::new();
                f.insert("radius".into(), 5.into());
                f
            })
            .unwrap();

        let mut tree = DataTree::with_registry(registry, "Node", "root").unwrap();
        let root = tree.root();
        let circle = tree.add_child(root, "Circle", "c").unwrap();
        assert_eq!(tree.field(circle, "radius"), Some(&Value::from(5)));

        assert!(matches!(
            tree.add_child(root, "Square", "s"),
            Err(TreeError::UnknownKind { .. })
        ));
        let doc = NodeDocument::new("Node", "n").with_child(NodeDocument::new("Square", "s"));
        assert!(tree.insert_document(root, 0, &doc).is_err());
        assert!(DataTree::with_registry(KindRegistry::new(), "Node", "r").is_err());
    }

    #[test]
    fn test_stale_handles() {
        let (mut tree, _, b, _, _) = setup();
        tree.delete(b).unwrap();
        assert_eq!(tree.name(b), None);
        assert!(tree.children(b).is_empty());
        assert_eq!(tree.parent(b), None);
        assert!(tree.to_document(b).is_err());
        assert!(tree.set_name(b, "x").is_err());
        assert!(tree.path_from(tree.root(), b).is_err());
    }

    #[test]
    fn test_dump() {
        let (tree, _, _, _, _) = setup();
        let dump = tree.dump(tree.root());
        assert!(dump.starts_with("root"));
        assert!(dump.contains("D"));
        assert_eq!(dump.lines().count(), 5);
    }
}

//! The capability interface of a sync source tree.
//!
//! A [`TreeView`](crate::view::TreeView) never owns the data it shows. It
//! holds plain [`SourceTree::Id`] handles into a tree that lives elsewhere and
//! reaches that tree only through this trait. Every method tolerates stale
//! handles: queries return `None` or an empty slice, mutations return
//! [`TreeError::InvalidNode`].

use std::fmt::Debug;
use std::hash::Hash;

use super::document::NodeDocument;
use super::kind::NodeKind;
use super::path;
use crate::error::{TreeError, TreeResult};

/// Requirements on a source node handle.
pub trait SourceId: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> SourceId for T where T: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

/// A tree of uniquely named nodes that a tree view can mirror and edit.
pub trait SourceTree {
    /// Handle addressing a node of this tree.
    type Id: SourceId;

    /// Whether `id` refers to a live node.
    fn contains(&self, id: Self::Id) -> bool;

    /// The node name.
    fn name(&self, id: Self::Id) -> Option<&str>;

    /// Rename a node. Fails with [`TreeError::NameConflict`] if a sibling
    /// already has the name.
    fn set_name(&mut self, id: Self::Id, name: &str) -> TreeResult<()>;

    /// The node kind.
    fn kind(&self, id: Self::Id) -> Option<&NodeKind>;

    /// Children in order. Empty for leaves and stale handles.
    fn children(&self, id: Self::Id) -> &[Self::Id];

    /// The parent, or `None` for the root and stale handles.
    fn parent(&self, id: Self::Id) -> Option<Self::Id>;

    /// Create a node of `kind` named `name` at `index` among the children of
    /// `parent`. The index is clamped to the child count.
    fn insert_new_child(
        &mut self,
        parent: Self::Id,
        kind: &NodeKind,
        index: usize,
        name: &str,
    ) -> TreeResult<Self::Id>;

    /// Materialize a detached subtree at `index` among the children of
    /// `parent`. The index is clamped to the child count.
    fn insert_document(
        &mut self,
        parent: Self::Id,
        index: usize,
        doc: &NodeDocument,
    ) -> TreeResult<Self::Id>;

    /// Delete a node and its subtree.
    fn delete(&mut self, id: Self::Id) -> TreeResult<()>;

    /// A detached copy of the node and its subtree.
    fn to_document(&self, id: Self::Id) -> TreeResult<NodeDocument>;

    /// Replace the node's kind, fields and children with those of `doc`.
    /// The node keeps its own name and position.
    fn copy_from(&mut self, id: Self::Id, doc: &NodeDocument) -> TreeResult<()>;

    /// Display label, if the node provides one distinct from its name.
    fn label(&self, _id: Self::Id) -> Option<String> {
        None
    }

    /// Whether the node is marked read-only.
    fn is_read_only(&self, _id: Self::Id) -> bool {
        false
    }

    /// Whether the node has any children.
    fn has_children(&self, id: Self::Id) -> bool {
        !self.children(id).is_empty()
    }

    /// Position of the node among its siblings.
    fn index_in_parent(&self, id: Self::Id) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// The child of `parent` named `name`.
    fn child_by_name(&self, parent: Self::Id, name: &str) -> Option<Self::Id> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.name(c) == Some(name))
    }

    /// Deep-copy `id` under `parent` at `index`, renamed to `name`.
    fn clone_node(
        &mut self,
        id: Self::Id,
        parent: Self::Id,
        index: usize,
        name: &str,
    ) -> TreeResult<Self::Id> {
        let mut doc = self.to_document(id)?;
        doc.name = name.to_string();
        self.insert_document(parent, index, &doc)
    }

    /// Path of `id` relative to `root`. The root's own path is empty.
    fn path_from(&self, root: Self::Id, id: Self::Id) -> TreeResult<String> {
        if !self.contains(root) || !self.contains(id) {
            return Err(TreeError::InvalidNode);
        }
        let mut names = Vec::new();
        let mut current = id;
        while current != root {
            names.push(self.name(current).ok_or(TreeError::InvalidNode)?);
            current = self.parent(current).ok_or(TreeError::NotDescendant)?;
        }
        names.reverse();
        Ok(path::join(names))
    }

    /// Resolve a path relative to `root`.
    fn find_path(&self, root: Self::Id, path: &str) -> TreeResult<Self::Id> {
        if !self.contains(root) {
            return Err(TreeError::InvalidNode);
        }
        let mut current = root;
        for segment in path::split(path) {
            current = self
                .child_by_name(current, &segment)
                .ok_or_else(|| TreeError::path_not_found(path))?;
        }
        Ok(current)
    }
}

/// Handle type of [`NoSource`]. It has no values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unbound {}

/// The source of a view that is not synchronized to anything.
///
/// Edits on such a view act on the view tree directly; this type only
/// satisfies the `S: SourceTree` parameter of the edit operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl SourceTree for NoSource {
    type Id = Unbound;

    fn contains(&self, id: Unbound) -> bool {
        match id {}
    }

    fn name(&self, id: Unbound) -> Option<&str> {
        match id {}
    }

    fn set_name(&mut self, id: Unbound, _name: &str) -> TreeResult<()> {
        match id {}
    }

    fn kind(&self, id: Unbound) -> Option<&NodeKind> {
        match id {}
    }

    fn children(&self, id: Unbound) -> &[Unbound] {
        match id {}
    }

    fn parent(&self, id: Unbound) -> Option<Unbound> {
        match id {}
    }

    fn insert_new_child(
        &mut self,
        parent: Unbound,
        _kind: &NodeKind,
        _index: usize,
        _name: &str,
    ) -> TreeResult<Unbound> {
        match parent {}
    }

    fn insert_document(
        &mut self,
        parent: Unbound,
        _index: usize,
        _doc: &NodeDocument,
    ) -> TreeResult<Unbound> {
        match parent {}
    }

    fn delete(&mut self, id: Unbound) -> TreeResult<()> {
        match id {}
    }

    fn to_document(&self, id: Unbound) -> TreeResult<NodeDocument> {
        match id {}
    }

    fn copy_from(&mut self, id: Unbound, _doc: &NodeDocument) -> TreeResult<()> {
        match id {}
    }
}

//! The tree view widget state.
//!
//! A [`TreeView`] owns an arena of [`ViewNode`]s. The view is either
//! synchronized to a [`SourceTree`], in which case each view node holds a
//! handle to the source node it mirrors, or it is a plain tree edited
//! directly (`TreeView<Unbound>`, see [`PlainTreeView`]).
//!
//! Reconciliation lives in `sync.rs`, selection in `selection.rs`, and the
//! structural edits in `edit.rs` and `transfer.rs`; they are all methods on
//! this type.

use std::fmt;
use std::sync::Arc;

use slotmap::SlotMap;

use arbor_core::logging::{DebugTree, TreeFormatOptions, TreeFormatter, targets};
use arbor_core::Signal;

use super::config::TreeViewConfig;
use super::node::{ViewId, ViewNode};
use crate::error::{Feedback, TreeError, TreeResult};
use crate::model::{FieldMap, NodeDocument, NodeKind, SourceId, SourceTree, Unbound, path};

/// Notifications published by a [`TreeView`].
///
/// Every structural edit ends with exactly one of `tree_changed` (a targeted
/// change under one node) or `resynced` (the whole view was reconciled
/// against its source). `tree_changed` is blocked while a resync runs.
pub struct TreeViewSignals {
    /// Children of this node changed.
    pub tree_changed: Signal<ViewId>,
    /// The view was fully re-synchronized; carries the root.
    pub resynced: Signal<ViewId>,
    /// The selection changed; carries the selected nodes in pre-order.
    pub selection_changed: Signal<Vec<ViewId>>,
    /// A user-facing message about a rejected or partially failed edit.
    pub feedback: Signal<Feedback>,
}

impl Default for TreeViewSignals {
    fn default() -> Self {
        Self {
            tree_changed: Signal::new(),
            resynced: Signal::new(),
            selection_changed: Signal::new(),
            feedback: Signal::new(),
        }
    }
}

/// An editable tree view.
pub struct TreeView<Id: SourceId = Unbound> {
    pub(crate) nodes: SlotMap<ViewId, ViewNode<Id>>,
    pub(crate) root: ViewId,
    pub(crate) config: TreeViewConfig,
    pub(crate) anchor: Option<ViewId>,
    pub(crate) needs_layout: bool,
    pub(crate) needs_render: bool,
    pub(crate) signals: Arc<TreeViewSignals>,
}

/// A tree view that is not synchronized to a source tree.
pub type PlainTreeView = TreeView<Unbound>;

impl<Id: SourceId> TreeView<Id> {
    /// Create a view holding only a root node.
    pub fn new(root_kind: impl Into<NodeKind>, root_name: impl Into<String>) -> Self {
        Self::with_config(root_kind, root_name, TreeViewConfig::default())
    }

    /// Create a view with custom settings.
    pub fn with_config(
        root_kind: impl Into<NodeKind>,
        root_name: impl Into<String>,
        config: TreeViewConfig,
    ) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ViewNode::new(root_kind.into(), root_name.into(), None));
        Self {
            nodes,
            root,
            config,
            anchor: None,
            needs_layout: true,
            needs_render: true,
            signals: Arc::new(TreeViewSignals::default()),
        }
    }

    /// The root view node.
    pub fn root(&self) -> ViewId {
        self.root
    }

    /// A view node's state.
    pub fn node(&self, id: ViewId) -> Option<&ViewNode<Id>> {
        self.nodes.get(id)
    }

    /// Whether `id` refers to a live view node.
    pub fn contains(&self, id: ViewId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of view nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The view settings.
    pub fn config(&self) -> &TreeViewConfig {
        &self.config
    }

    /// Replace the view settings. Takes effect on the next reconciliation.
    pub fn set_config(&mut self, config: TreeViewConfig) {
        self.config = config;
    }

    /// The view's notifications.
    pub fn signals(&self) -> &TreeViewSignals {
        &self.signals
    }

    /// Whether `id` is the root of this view.
    pub fn is_root(&self, id: ViewId) -> bool {
        id == self.root
    }

    /// The parent of a view node.
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.nodes.get(id)?.parent
    }

    /// Children of a view node in order.
    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Position of a node among its siblings.
    pub fn index_in_parent(&self, id: ViewId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// The child of `parent` named `name`.
    pub fn child_by_name(&self, parent: ViewId, name: &str) -> Option<ViewId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.nodes[c].name == name)
    }

    /// Node IDs of the subtree at `id` in pre-order.
    pub fn depth_first_preorder(&self, id: ViewId) -> Vec<ViewId> {
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

    /// Set a node's explicit label text.
    pub fn set_text(&mut self, id: ViewId, text: impl Into<String>) -> TreeResult<()> {
        let node = self.nodes.get_mut(id).ok_or(TreeError::InvalidNode)?;
        node.text = text.into();
        self.needs_render = true;
        Ok(())
    }

    /// Set a node's payload. Only meaningful for unsynced nodes.
    pub fn set_fields(&mut self, id: ViewId, fields: FieldMap) -> TreeResult<()> {
        let node = self.nodes.get_mut(id).ok_or(TreeError::InvalidNode)?;
        node.fields = fields;
        Ok(())
    }

    /// Mark a node read-only. A read-only root makes the whole view
    /// non-editable. Synced nodes take this from their source on every
    /// reconciliation.
    pub fn set_read_only(&mut self, id: ViewId, read_only: bool) -> TreeResult<()> {
        let node = self.nodes.get_mut(id).ok_or(TreeError::InvalidNode)?;
        node.read_only = read_only;
        self.needs_render = true;
        Ok(())
    }

    /// Whether edits on this view are rejected.
    pub fn is_read_only(&self) -> bool {
        self.nodes[self.root].read_only
    }

    /// Append a child to an unsynced node.
    pub fn add_view_child(
        &mut self,
        parent: ViewId,
        kind: impl Into<NodeKind>,
        name: &str,
    ) -> TreeResult<ViewId> {
        if !self.contains(parent) {
            return Err(TreeError::InvalidNode);
        }
        if self.child_by_name(parent, name).is_some() {
            return Err(TreeError::name_conflict(name));
        }
        let index = self.children(parent).len();
        let id = self.create_child(parent, index, kind.into(), name.to_string());
        self.update_view_indices();
        Ok(id)
    }

    /// Display label of a node.
    ///
    /// The source node's label or name for synced nodes, otherwise the
    /// explicit text, otherwise the view node's name.
    pub fn label<S: SourceTree<Id = Id>>(&self, src: &S, id: ViewId) -> String {
        let Some(node) = self.nodes.get(id) else {
            return String::new();
        };
        if let Some(sk) = node.sync_node.filter(|&sk| src.contains(sk)) {
            return src
                .label(sk)
                .or_else(|| src.name(sk).map(str::to_string))
                .unwrap_or_default();
        }
        if !node.text.is_empty() {
            return node.text.clone();
        }
        node.name.clone()
    }

    /// The view node mirroring source node `id`.
    pub fn find_sync_node(&self, id: Id) -> Option<ViewId> {
        self.depth_first_preorder(self.root)
            .into_iter()
            .find(|&v| self.nodes[v].sync_node == Some(id))
    }

    /// Path of `id` below `root`, over view node names.
    pub fn view_path_from(&self, root: ViewId, id: ViewId) -> TreeResult<String> {
        if !self.contains(root) || !self.contains(id) {
            return Err(TreeError::InvalidNode);
        }
        let mut names = Vec::new();
        let mut current = id;
        while current != root {
            let node = &self.nodes[current];
            names.push(node.name.as_str());
            current = node.parent.ok_or(TreeError::NotDescendant)?;
        }
        names.reverse();
        Ok(path::join(names))
    }

    /// Resolve a path of view node names below `root`.
    pub fn find_view_path(&self, root: ViewId, path: &str) -> TreeResult<ViewId> {
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

    /// Whether a layout pass was requested.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Whether a repaint was requested.
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// Read and clear the layout request.
    pub fn take_needs_layout(&mut self) -> bool {
        std::mem::take(&mut self.needs_layout)
    }

    /// Read and clear the render request.
    pub fn take_needs_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    /// Render the view tree for debugging.
    pub fn dump(&self) -> String {
        TreeFormatter::with_options(TreeFormatOptions::detailed()).format_subtree(self, self.root)
    }

    pub(crate) fn create_child(
        &mut self,
        parent: ViewId,
        index: usize,
        kind: NodeKind,
        name: String,
    ) -> ViewId {
        let id = self.nodes.insert(ViewNode::new(kind, name, Some(parent)));
        let children = &mut self.nodes[parent].children;
        let index = index.min(children.len());
        children.insert(index, id);
        id
    }

    /// Remove a node and its subtree. Clears the anchor if it was inside.
    pub(crate) fn destroy_subtree(&mut self, id: ViewId) {
        if let Some(parent) = self.parent(id) {
            self.nodes[parent].children.retain(|&c| c != id);
        }
        for node in self.depth_first_preorder(id) {
            if self.anchor == Some(node) {
                self.anchor = None;
            }
            self.nodes.remove(node);
        }
    }

    /// Materialize a document as an unsynced subtree.
    pub(crate) fn insert_document(
        &mut self,
        parent: ViewId,
        index: usize,
        doc: &NodeDocument,
    ) -> ViewId {
        let id = self.create_child(parent, index, doc.kind.clone(), doc.name.clone());
        self.nodes[id].fields = doc.fields.clone();
        for (i, child) in doc.children.iter().enumerate() {
            self.insert_document(id, i, child);
        }
        id
    }

    /// A detached copy of an unsynced subtree.
    pub(crate) fn view_document(&self, id: ViewId) -> NodeDocument {
        let node = &self.nodes[id];
        NodeDocument {
            kind: node.kind.clone(),
            name: node.name.clone(),
            fields: node.fields.clone(),
            children: node.children.iter().map(|&c| self.view_document(c)).collect(),
        }
    }

    /// Renumber every node in pre-order from zero.
    pub(crate) fn update_view_indices(&mut self) {
        for (i, id) in self.depth_first_preorder(self.root).into_iter().enumerate() {
            self.nodes[id].view_index = i;
        }
        self.needs_layout = true;
    }

    pub(crate) fn emit_feedback(&self, feedback: Feedback) {
        tracing::debug!(target: targets::EDIT, %feedback, "edit feedback");
        self.signals.feedback.emit(feedback);
    }

    /// Emit [`Feedback::RootNode`] and return true if `id` is the root.
    pub(crate) fn reject_root(&self, id: ViewId, action: &'static str) -> bool {
        if self.is_root(id) {
            self.emit_feedback(Feedback::RootNode { action });
            return true;
        }
        false
    }

    /// Emit [`Feedback::ReadOnly`] and return true if the view is read-only.
    pub(crate) fn reject_read_only(&self, action: &'static str) -> bool {
        if self.is_read_only() {
            self.emit_feedback(Feedback::ReadOnly { action });
            return true;
        }
        false
    }
}

impl<Id: SourceId> DebugTree for TreeView<Id> {
    type Id = ViewId;

    fn debug_name(&self, id: ViewId) -> Option<String> {
        self.nodes.get(id).map(|n| n.name.clone())
    }

    fn debug_kind(&self, id: ViewId) -> Option<String> {
        self.nodes.get(id).map(|n| n.kind.to_string())
    }

    fn debug_children(&self, id: ViewId) -> Vec<ViewId> {
        self.children(id).to_vec()
    }

    fn debug_detail(&self, id: ViewId) -> Option<String> {
        let n = self.nodes.get(id)?;
        let mut detail = format!("index={}", n.view_index);
        if n.closed {
            detail.push_str(", closed");
        }
        if n.selected {
            detail.push_str(", selected");
        }
        if let Some(sk) = &n.sync_node {
            detail.push_str(&format!(", sync={sk:?}"));
        }
        Some(detail)
    }
}

impl<Id: SourceId> fmt::Debug for TreeView<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeView")
            .field("root", &self.root)
            .field("node_count", &self.nodes.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(TreeView<crate::model::NodeId>: Send, Sync);
static_assertions::assert_impl_all!(PlainTreeView: Send, Sync);

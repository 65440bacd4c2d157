//! Structural edits: insert, add child, delete, duplicate.
//!
//! Every edit works on one of two trees. If the view node is synced, the
//! edit mutates the source tree and the whole view is re-synchronized
//! (`resynced`). Otherwise the view tree is edited directly and a single
//! `tree_changed` is emitted for the parent that changed.
//!
//! Preconditions (read-only view, root node, stale handle) are reported
//! through the `feedback` signal and the edit does nothing.

use arbor_core::logging::targets;

use super::node::ViewId;
use super::tree_view::TreeView;
use crate::error::{Feedback, TreeError};
use crate::model::{KindRegistry, NodeKind, SourceId, SourceTree};

/// The confirmed answer to "number and type of items to insert".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItems {
    /// Kind of the new nodes.
    pub kind: NodeKind,
    /// How many to insert.
    pub count: usize,
}

impl NewItems {
    /// `count` new nodes of `kind`.
    pub fn new(kind: impl Into<NodeKind>, count: usize) -> Self {
        Self {
            kind: kind.into(),
            count,
        }
    }

    /// One new node of `kind`.
    pub fn single(kind: impl Into<NodeKind>) -> Self {
        Self::new(kind, 1)
    }
}

/// Which tree an edit on a view node applies to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum EditTarget<Id> {
    /// The view tree itself.
    View,
    /// The source tree, at this node.
    Source(Id),
}

/// `base`, or the first of `base-1`, `base-2`, ... that is free.
pub(crate) fn numbered_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|name| !taken(name))
        .unwrap_or_else(|| base.to_string())
}

/// `base` with `suffix` appended, repeatedly, until the name is free.
pub(crate) fn suffixed_name(base: &str, suffix: &str, taken: impl Fn(&str) -> bool) -> String {
    if suffix.is_empty() {
        return numbered_name(base, taken);
    }
    let mut name = format!("{base}{suffix}");
    while taken(&name) {
        name.push_str(suffix);
    }
    name
}

impl<Id: SourceId> TreeView<Id> {
    /// Insert new nodes as siblings before `view`.
    ///
    /// Returns the last inserted node, which is selected.
    pub fn insert_before<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        view: ViewId,
        items: &NewItems,
    ) -> Option<ViewId> {
        self.insert_at(src, view, 0, items, "Insert Before")
    }

    /// Insert new nodes as siblings after `view`.
    ///
    /// Returns the last inserted node, which is selected.
    pub fn insert_after<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        view: ViewId,
        items: &NewItems,
    ) -> Option<ViewId> {
        self.insert_at(src, view, 1, items, "Insert After")
    }

    /// Insert new nodes as siblings at offset `rel` from `view`.
    ///
    /// New nodes are named `new-<kind>-<position>`, bumped with a numeric
    /// suffix if that name is taken. Returns the last inserted node, which is
    /// selected.
    pub fn insert_at<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        view: ViewId,
        rel: usize,
        items: &NewItems,
        action: &'static str,
    ) -> Option<ViewId> {
        if !self.contains(view)
            || items.count == 0
            || self.reject_read_only(action)
            || self.reject_root(view, action)
        {
            return None;
        }
        let parent = self.parent(view)?;
        match self.edit_target(src, view, action)? {
            EditTarget::Source(sk) => {
                let Some(psrc) = src.parent(sk) else {
                    self.emit_feedback(Feedback::error(action, TreeError::InvalidNode));
                    return None;
                };
                let index = src.index_in_parent(sk)? + rel;
                self.add_source_nodes(src, parent, psrc, index, items, action)
            }
            EditTarget::View => {
                let index = self.index_in_parent(view)? + rel;
                Some(self.add_view_nodes(parent, index, items))
            }
        }
    }

    /// Insert new nodes at the start of `view`'s own children.
    ///
    /// Returns the last inserted node, which is selected.
    pub fn add_child_node<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        view: ViewId,
        items: &NewItems,
    ) -> Option<ViewId> {
        const ACTION: &str = "Add Child";
        if !self.contains(view) || items.count == 0 || self.reject_read_only(ACTION) {
            return None;
        }
        match self.edit_target(src, view, ACTION)? {
            EditTarget::Source(sk) => self.add_source_nodes(src, view, sk, 0, items, ACTION),
            EditTarget::View => Some(self.add_view_nodes(view, 0, items)),
        }
    }

    /// Delete `view` and its subtree.
    ///
    /// If the node is selected, it is closed and the selection moves to the
    /// next sibling, else the previous sibling, else the parent.
    pub fn delete_node<S: SourceTree<Id = Id>>(&mut self, src: &mut S, view: ViewId) -> bool {
        const ACTION: &str = "Delete";
        if !self.contains(view) || self.reject_read_only(ACTION) || self.reject_root(view, ACTION) {
            return false;
        }
        let Some(target) = self.edit_target(src, view, ACTION) else {
            return false;
        };

        if self.anchor == Some(view) || self.nodes[view].selected {
            self.close(view);
            let next = self.neighbor_of(view);
            match next {
                Some(next) => {
                    self.select_one(next);
                }
                None => {
                    self.unselect_all();
                }
            }
        }

        match target {
            EditTarget::Source(sk) => {
                if let Err(err) = src.delete(sk) {
                    self.emit_feedback(Feedback::error(ACTION, err));
                    return false;
                }
                self.resync(src);
            }
            EditTarget::View => {
                let before = self.selected_views();
                let parent = self.parent(view);
                self.destroy_subtree(view);
                self.update_view_indices();
                if let Some(parent) = parent {
                    self.signals.tree_changed.emit(parent);
                }
                self.finish_selection_change(before);
            }
        }
        tracing::debug!(target: targets::EDIT, ?view, "deleted node");
        true
    }

    /// Duplicate `view` as its next sibling, named `<name><copy_suffix>`.
    ///
    /// On a synced node this is [`duplicate_sync`](Self::duplicate_sync).
    /// On an unsynced node the selection is left unchanged.
    pub fn duplicate<S: SourceTree<Id = Id>>(&mut self, src: &mut S, view: ViewId) -> Option<ViewId> {
        const ACTION: &str = "Duplicate";
        if !self.contains(view) || self.reject_read_only(ACTION) || self.reject_root(view, ACTION) {
            return None;
        }
        match self.edit_target(src, view, ACTION)? {
            EditTarget::Source(_) => self.duplicate_sync(src, view),
            EditTarget::View => {
                let parent = self.parent(view)?;
                let index = self.index_in_parent(view)?;
                let name = suffixed_name(&self.nodes[view].name, &self.config.copy_suffix, |n| {
                    self.child_by_name(parent, n).is_some()
                });
                let mut doc = self.view_document(view);
                doc.name = name;
                let copy = self.insert_document(parent, index + 1, &doc);
                self.update_view_indices();
                self.signals.tree_changed.emit(parent);
                Some(copy)
            }
        }
    }

    /// Duplicate the source node of `view` as its next sibling, then select
    /// the copy.
    pub fn duplicate_sync<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        view: ViewId,
    ) -> Option<ViewId> {
        const ACTION: &str = "Duplicate";
        if !self.contains(view) || self.reject_read_only(ACTION) || self.reject_root(view, ACTION) {
            return None;
        }
        let EditTarget::Source(sk) = self.edit_target(src, view, ACTION)? else {
            tracing::debug!(target: targets::EDIT, ?view, "duplicate_sync on an unsynced node");
            return None;
        };
        let parent = self.parent(view)?;
        let Some(psrc) = src.parent(sk) else {
            self.emit_feedback(Feedback::error(ACTION, TreeError::InvalidNode));
            return None;
        };
        let index = src.index_in_parent(sk)?;
        let base = src.name(sk)?.to_string();
        let name = suffixed_name(&base, &self.config.copy_suffix, |n| {
            src.child_by_name(psrc, n).is_some()
        });
        if let Err(err) = src.clone_node(sk, psrc, index + 1, &name) {
            self.emit_feedback(Feedback::error(ACTION, err));
            return None;
        }
        self.resync(src);

        let copy = self.child_by_name(parent, &format!("{}{}", self.config.name_prefix, name))?;
        self.select_one(copy);
        Some(copy)
    }

    /// Kinds that may be inserted next to `view`: its base kind and every
    /// kind extending it.
    pub fn insertable_kinds(&self, view: ViewId, registry: &KindRegistry) -> Vec<NodeKind> {
        let Some(node) = self.nodes.get(view) else {
            return Vec::new();
        };
        let base = registry.base_of(&node.kind).unwrap_or(&node.kind);
        registry.embedders_of(base)
    }

    /// Which tree edits on `view` apply to. Emits feedback and returns `None`
    /// if the view's source node is gone.
    pub(crate) fn edit_target<S: SourceTree<Id = Id>>(
        &self,
        src: &S,
        view: ViewId,
        action: &'static str,
    ) -> Option<EditTarget<Id>> {
        match self.nodes.get(view)?.sync_node {
            None => Some(EditTarget::View),
            Some(sk) if src.contains(sk) => Some(EditTarget::Source(sk)),
            Some(_) => {
                self.emit_feedback(Feedback::error(action, TreeError::InvalidNode));
                None
            }
        }
    }

    fn add_source_nodes<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        parent: ViewId,
        psrc: Id,
        index: usize,
        items: &NewItems,
        action: &'static str,
    ) -> Option<ViewId> {
        let mut last = None;
        for i in 0..items.count {
            let base = format!("new-{}-{}", items.kind, index + i);
            let name = numbered_name(&base, |n| src.child_by_name(psrc, n).is_some());
            match src.insert_new_child(psrc, &items.kind, index + i, &name) {
                Ok(_) => last = Some(name),
                Err(err) => self.emit_feedback(Feedback::error(action, err)),
            }
        }
        self.resync(src);
        self.open(parent);

        let name = last?;
        let selected = self.child_by_name(parent, &format!("{}{}", self.config.name_prefix, name))?;
        self.select_one(selected);
        Some(selected)
    }

    fn add_view_nodes(&mut self, parent: ViewId, index: usize, items: &NewItems) -> ViewId {
        let mut last = parent;
        for i in 0..items.count {
            let base = format!("new-{}-{}", items.kind, index + i);
            let name = numbered_name(&base, |n| self.child_by_name(parent, n).is_some());
            last = self.create_child(parent, index + i, items.kind.clone(), name);
        }
        self.update_view_indices();
        self.open(parent);
        self.signals.tree_changed.emit(parent);
        self.select_one(last);
        last
    }

    fn neighbor_of(&self, view: ViewId) -> Option<ViewId> {
        let parent = self.parent(view)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == view)?;
        siblings
            .get(pos + 1)
            .or_else(|| pos.checked_sub(1).and_then(|p| siblings.get(p)))
            .copied()
            .or(Some(parent))
    }
}

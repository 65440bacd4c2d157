//! Selection tracking and keyboard-style navigation.

use serde::{Deserialize, Serialize};

use super::node::ViewId;
use super::tree_view::TreeView;
use crate::model::SourceId;

/// Selection behavior mode for views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    /// No items can be selected.
    #[serde(rename = "none")]
    NoSelection,
    /// Only one item can be selected at a time.
    #[serde(rename = "single")]
    SingleSelection,
    /// Multiple items can be toggled individually.
    #[serde(rename = "multi")]
    MultiSelection,
    /// Toggling plus range selection from the anchor (default).
    #[default]
    #[serde(rename = "extended")]
    ExtendedSelection,
}

/// How a click or key press changes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    /// Select only this node.
    SelectOne,
    /// Toggle this node, keeping the rest.
    ExtendOne,
    /// Select the range from the anchor to this node.
    ExtendContinuous,
    /// Unselect this node.
    Unselect,
}

impl<Id: SourceId> TreeView<Id> {
    /// Apply a selection action to `id`.
    ///
    /// Returns `true` if the selection changed, in which case
    /// `selection_changed` was emitted.
    pub fn select_action(&mut self, id: ViewId, action: SelectAction) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mode = self.config.selection_mode;
        let action = match (mode, action) {
            (SelectionMode::NoSelection, _) => return false,
            (_, SelectAction::Unselect) => SelectAction::Unselect,
            (SelectionMode::SingleSelection, _) => SelectAction::SelectOne,
            (SelectionMode::MultiSelection, SelectAction::ExtendContinuous) => SelectAction::ExtendOne,
            (_, action) => action,
        };

        let before = self.selected_views();
        match action {
            SelectAction::SelectOne => {
                for other in &before {
                    self.nodes[*other].selected = false;
                }
                self.nodes[id].selected = true;
                self.anchor = Some(id);
            }
            SelectAction::ExtendOne => {
                let node = &mut self.nodes[id];
                node.selected = !node.selected;
                self.anchor = Some(id);
            }
            SelectAction::ExtendContinuous => match self.anchor.filter(|&a| self.contains(a)) {
                Some(anchor) => {
                    let order = self.depth_first_preorder(self.root);
                    let pos = |target: ViewId| order.iter().position(|&v| v == target);
                    if let (Some(from), Some(to)) = (pos(anchor), pos(id)) {
                        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
                        for &v in &order[lo..=hi] {
                            self.nodes[v].selected = true;
                        }
                    }
                }
                None => {
                    self.nodes[id].selected = true;
                    self.anchor = Some(id);
                }
            },
            SelectAction::Unselect => {
                self.nodes[id].selected = false;
                if self.anchor == Some(id) {
                    self.anchor = None;
                }
            }
        }
        self.finish_selection_change(before)
    }

    /// Select only `id`.
    pub fn select_one(&mut self, id: ViewId) -> bool {
        self.select_action(id, SelectAction::SelectOne)
    }

    /// Clear the selection.
    pub fn unselect_all(&mut self) -> bool {
        let before = self.selected_views();
        for id in &before {
            self.nodes[*id].selected = false;
        }
        self.anchor = None;
        self.finish_selection_change(before)
    }

    /// Selected view nodes in pre-order.
    pub fn selected_views(&self) -> Vec<ViewId> {
        self.depth_first_preorder(self.root)
            .into_iter()
            .filter(|&id| self.nodes[id].selected)
            .collect()
    }

    /// Source nodes of the selected view nodes, in pre-order.
    ///
    /// Unsynced selected nodes are skipped.
    pub fn selected_source_nodes(&self) -> Vec<Id> {
        self.selected_views()
            .into_iter()
            .filter_map(|id| self.nodes[id].sync_node)
            .collect()
    }

    /// The node range selection extends from.
    pub fn selection_anchor(&self) -> Option<ViewId> {
        self.anchor
    }

    /// Apply `action` to the next visible node after `id`.
    ///
    /// Returns the node moved to, or `None` at the end of the tree.
    pub fn move_down(&mut self, id: ViewId, action: SelectAction) -> Option<ViewId> {
        let next = self.next_visible(id)?;
        self.select_action(next, action);
        Some(next)
    }

    /// Apply `action` to the previous visible node before `id`.
    ///
    /// Returns the node moved to, or `None` at the root.
    pub fn move_up(&mut self, id: ViewId, action: SelectAction) -> Option<ViewId> {
        let prev = self.previous_visible(id)?;
        self.select_action(prev, action);
        Some(prev)
    }

    /// Whether every ancestor of `id` is open.
    pub fn is_visible(&self, id: ViewId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if self.nodes[p].closed {
                return false;
            }
            current = self.nodes[p].parent;
        }
        self.contains(id)
    }

    /// Expand a node. Leaves stay closed.
    pub fn open(&mut self, id: ViewId) {
        if let Some(node) = self.nodes.get_mut(id)
            && node.closed
            && !node.children.is_empty()
        {
            node.closed = false;
            self.needs_layout = true;
        }
    }

    /// Collapse a node.
    pub fn close(&mut self, id: ViewId) {
        if let Some(node) = self.nodes.get_mut(id)
            && !node.closed
        {
            node.closed = true;
            self.needs_layout = true;
        }
    }

    /// Collapse an open node or expand a closed one.
    pub fn toggle_close(&mut self, id: ViewId) {
        match self.nodes.get(id).map(|n| n.closed) {
            Some(true) => self.open(id),
            Some(false) => self.close(id),
            None => {}
        }
    }

    fn next_visible(&self, id: ViewId) -> Option<ViewId> {
        let node = self.nodes.get(id)?;
        if !node.closed
            && let Some(&first) = node.children.first()
        {
            return Some(first);
        }
        let mut current = id;
        loop {
            let parent = self.parent(current)?;
            let siblings = self.children(parent);
            let pos = siblings.iter().position(|&c| c == current)?;
            if let Some(&next) = siblings.get(pos + 1) {
                return Some(next);
            }
            current = parent;
        }
    }

    fn previous_visible(&self, id: ViewId) -> Option<ViewId> {
        let parent = self.parent(id)?;
        let pos = self.index_in_parent(id)?;
        if pos == 0 {
            return Some(parent);
        }
        let mut current = self.children(parent)[pos - 1];
        loop {
            let node = &self.nodes[current];
            match node.children.last() {
                Some(&last) if !node.closed => current = last,
                _ => return Some(current),
            }
        }
    }

    pub(crate) fn finish_selection_change(&mut self, before: Vec<ViewId>) -> bool {
        let after = self.selected_views();
        if after == before {
            return false;
        }
        self.needs_render = true;
        self.signals.selection_changed.emit(after);
        true
    }
}

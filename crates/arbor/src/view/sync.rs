//! Reconciliation of a view tree against its source tree.
//!
//! [`TreeView::sync_to_src`] walks a source node and its view node in
//! parallel. Each view child is keyed by a name derived from its source
//! child (`name_prefix` + source name), and the existing children are
//! configured against the required name list with a minimal diff: children
//! already present are kept with their open and selection state, missing ones
//! are created, stale ones destroyed, and the order fixed up. Running it twice
//! against an unchanged source makes no structural change and emits nothing.

use std::collections::{HashMap, HashSet};

use arbor_core::logging::{PerfSpan, targets};

use super::node::{ViewId, ViewNode};
use super::tree_view::TreeView;
use crate::model::{SourceId, SourceTree};

impl<Id: SourceId> TreeView<Id> {
    /// Bind the root to `source_root` and build the whole view.
    ///
    /// This is the initial build: nodes at `open_depth` and deeper start
    /// collapsed.
    pub fn sync_tree<S: SourceTree<Id = Id>>(&mut self, src: &S, source_root: Id) {
        let _perf = PerfSpan::new("sync_tree");
        let before = self.selected_views();
        let root = self.root;
        let mut counter = 0;
        self.set_sync_node(src, root, source_root, &mut counter, true, 0);
        self.finish_selection_change(before);
        tracing::debug!(target: targets::SYNC, nodes = counter, "built tree view");
    }

    /// Bind `view` to source node `id` and reconcile its subtree.
    pub fn set_sync_node<S: SourceTree<Id = Id>>(
        &mut self,
        src: &S,
        view: ViewId,
        id: Id,
        counter: &mut usize,
        init: bool,
        depth: usize,
    ) {
        if let Some(node) = self.nodes.get_mut(view) {
            node.sync_node = Some(id);
            self.sync_to_src(src, view, counter, init, depth);
        }
    }

    /// Reconcile the whole view against its source and emit `resynced`.
    ///
    /// View indices continue from the root's current index. `tree_changed`
    /// is blocked for the duration. If the reconcile dropped selected nodes,
    /// `selection_changed` follows `resynced`.
    pub fn resync<S: SourceTree<Id = Id>>(&mut self, src: &S) {
        let _perf = PerfSpan::new("resync");
        let signals = self.signals.clone();
        let before = self.selected_views();
        {
            let _blocked = signals.tree_changed.blocked_scope();
            let root = self.root;
            let mut counter = self.nodes[root].view_index;
            self.sync_to_src(src, root, &mut counter, false, 0);
        }
        self.needs_render = true;
        signals.resynced.emit(self.root);
        self.finish_selection_change(before);
    }

    /// Reconcile `view` and its subtree against the source node it is bound to.
    ///
    /// `counter` is the shared pre-order index; `init` marks the initial
    /// build and `depth` is the depth of `view` below the root being synced.
    pub fn sync_to_src<S: SourceTree<Id = Id>>(
        &mut self,
        src: &S,
        view: ViewId,
        counter: &mut usize,
        init: bool,
        depth: usize,
    ) {
        let Some(node) = self.nodes.get_mut(view) else {
            tracing::warn!(target: targets::SYNC, ?view, "sync on a destroyed view node");
            return;
        };
        node.view_index = *counter;
        *counter += 1;

        let Some(sk) = node.sync_node.filter(|&sk| src.contains(sk)) else {
            tracing::warn!(target: targets::SYNC, ?view, "view node has no live sync node");
            self.detach_stale(view);
            return;
        };

        node.name = format!("{}{}", self.config.name_prefix, src.name(sk).unwrap_or_default());
        node.kind = src.kind(sk).cloned().unwrap_or_default();
        node.read_only = src.is_read_only(sk);
        if node.parent.is_some() && init && depth >= self.config.open_depth {
            node.closed = true;
        }

        let mut seen = HashSet::new();
        let mut wanted: Vec<(String, Id)> = Vec::new();
        for &child in src.children(sk) {
            let name = format!("{}{}", self.config.name_prefix, src.name(child).unwrap_or_default());
            if seen.insert(name.clone()) {
                wanted.push((name, child));
            } else {
                tracing::warn!(target: targets::SYNC, %name, "duplicate source child name, skipping");
            }
        }

        let names: Vec<&str> = wanted.iter().map(|(n, _)| n.as_str()).collect();
        let modified = self.config_children(view, &names);

        let kids = self.nodes[view].children.clone();
        for (vk, (_, skid)) in kids.into_iter().zip(wanted) {
            self.nodes[vk].sync_node = Some(skid);
            self.sync_to_src(src, vk, counter, init, depth + 1);
        }

        if !src.has_children(sk) {
            self.nodes[view].closed = true;
        }
        if modified {
            tracing::trace!(target: targets::SYNC, ?view, "children reconfigured");
            self.signals.tree_changed.emit(view);
        }
        self.needs_layout = true;
    }

    /// Make the children of `view` match `names`, in order.
    ///
    /// Returns `true` if the child list changed in any way.
    pub(crate) fn config_children(&mut self, view: ViewId, names: &[&str]) -> bool {
        let old = self.nodes[view].children.clone();

        let mut by_name: HashMap<String, ViewId> = HashMap::with_capacity(old.len());
        let mut removed = Vec::new();
        for &child in &old {
            let name = self.nodes[child].name.clone();
            if by_name.contains_key(&name) {
                removed.push(child);
            } else {
                by_name.insert(name, child);
            }
        }

        let mut new_children = Vec::with_capacity(names.len());
        for &name in names {
            match by_name.remove(name) {
                Some(existing) => new_children.push(existing),
                None => {
                    let kind = self.nodes[view].kind.clone();
                    let id = self
                        .nodes
                        .insert(ViewNode::new(kind, name.to_string(), Some(view)));
                    new_children.push(id);
                }
            }
        }
        removed.extend(by_name.into_values());

        let modified = old != new_children;
        self.nodes[view].children = new_children;
        for child in removed {
            self.nodes[child].parent = None;
            self.destroy_subtree(child);
        }
        modified
    }

    fn detach_stale(&mut self, view: ViewId) {
        let kids = std::mem::take(&mut self.nodes[view].children);
        let had_children = !kids.is_empty();
        for child in kids {
            self.nodes[child].parent = None;
            self.destroy_subtree(child);
        }
        self.nodes[view].closed = true;
        if had_children {
            self.signals.tree_changed.emit(view);
        }
        self.needs_layout = true;
    }
}

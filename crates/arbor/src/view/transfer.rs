//! Clipboard and drag-and-drop transfer of subtrees.
//!
//! Nodes travel as [`MimeData`]: each node contributes its path relative to
//! the view root followed by its serialized document. Paste operations decode
//! the payload, resolve name collisions and insert the documents; a move is a
//! paste followed by [`TreeView::drop_delete_source`] on the originating view.

use arbor_core::logging::targets;

use super::drag_drop::{DropAction, DropPosition};
use super::edit::{EditTarget, suffixed_name};
use super::node::ViewId;
use super::tree_view::TreeView;
use crate::error::{Feedback, TreeError, TreeResult};
use crate::mime::{DecodedPayload, MimeData, decode_nodes, encode_node};
use crate::model::{SourceId, SourceTree, path};
use crate::platform::MimeClipboard;

impl<Id: SourceId> TreeView<Id> {
    /// Append the entries describing `view` to `md`.
    ///
    /// A synced node is serialized from the source tree with its path
    /// relative to the source root; an unsynced node from the view tree.
    pub fn mime_data<S: SourceTree<Id = Id>>(
        &self,
        src: &S,
        view: ViewId,
        md: &mut MimeData,
    ) -> TreeResult<()> {
        let node = self.nodes.get(view).ok_or(TreeError::InvalidNode)?;
        match node.sync_node {
            Some(sk) => {
                let sroot = self.nodes[self.root].sync_node.ok_or(TreeError::InvalidNode)?;
                let node_path = src.path_from(sroot, sk)?;
                let doc = src.to_document(sk)?;
                encode_node(md, &node_path, &doc)
            }
            None => {
                let node_path = self.view_path_from(self.root, view)?;
                encode_node(md, &node_path, &self.view_document(view))
            }
        }
    }

    /// Payload of every selected node, in pre-order.
    ///
    /// Nodes that fail to serialize are reported through `feedback` and
    /// left out.
    pub fn selection_mime_data<S: SourceTree<Id = Id>>(&self, src: &S) -> MimeData {
        let mut md = MimeData::new();
        for view in self.selected_views() {
            if let Err(err) = self.mime_data(src, view, &mut md) {
                self.emit_feedback(Feedback::error("Copy", err));
            }
        }
        md
    }

    /// Put the selection on the clipboard.
    pub fn copy<S: SourceTree<Id = Id>>(&self, src: &S, clipboard: &mut dyn MimeClipboard) -> bool {
        let md = self.selection_mime_data(src);
        if md.is_empty() {
            return false;
        }
        let entries = md.len();
        match clipboard.write(md) {
            Ok(()) => {
                tracing::debug!(target: targets::EDIT, entries, "copied selection");
                true
            }
            Err(err) => {
                self.emit_feedback(Feedback::error("Copy", err));
                false
            }
        }
    }

    /// Copy the selection to the clipboard, then delete it.
    ///
    /// The tree is re-synchronized (or `tree_changed` emitted) once for the
    /// whole batch.
    pub fn cut<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        clipboard: &mut dyn MimeClipboard,
    ) -> bool {
        const ACTION: &str = "Cut";
        if self.reject_read_only(ACTION) {
            return false;
        }
        let selected = self.selected_views();
        if selected.is_empty() {
            return false;
        }
        if selected.contains(&self.root) {
            self.emit_feedback(Feedback::RootNode { action: ACTION });
            return false;
        }
        if !self.copy(&*src, clipboard) {
            return false;
        }
        self.unselect_all();

        let mut synced = false;
        for view in selected {
            // Already gone if an ancestor was cut first.
            let Some(sync_node) = self.nodes.get(view).map(|n| n.sync_node) else {
                continue;
            };
            match sync_node {
                Some(sk) => {
                    synced = true;
                    if src.contains(sk)
                        && let Err(err) = src.delete(sk)
                    {
                        self.emit_feedback(Feedback::error(ACTION, err));
                    }
                }
                None => self.destroy_subtree(view),
            }
        }

        if synced {
            self.resync(&*src);
        } else {
            self.update_view_indices();
            self.signals.tree_changed.emit(self.root);
        }
        true
    }

    /// Replace the content of `view` with the first node of the payload.
    ///
    /// The node keeps its name; kind, fields and children are taken from the
    /// pasted document.
    pub fn paste_assign<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        view: ViewId,
        md: &MimeData,
    ) -> bool {
        const ACTION: &str = "Paste Assign";
        if !self.contains(view) || self.reject_read_only(ACTION) {
            return false;
        }
        let Some(target) = self.edit_target(&*src, view, ACTION) else {
            return false;
        };
        let decoded = self.decode_payload(md, ACTION);
        let Some(doc) = decoded.nodes.into_iter().next() else {
            return false;
        };

        match target {
            EditTarget::Source(sk) => {
                if let Err(err) = src.copy_from(sk, &doc) {
                    self.emit_feedback(Feedback::error(ACTION, err));
                    return false;
                }
                self.resync(&*src);
            }
            EditTarget::View => {
                if let Some(name) = doc.duplicate_sibling_name() {
                    self.emit_feedback(Feedback::error(ACTION, TreeError::name_conflict(name)));
                    return false;
                }
                let before = self.selected_views();
                for child in self.nodes[view].children.clone() {
                    self.destroy_subtree(child);
                }
                let node = &mut self.nodes[view];
                node.kind = doc.kind.clone();
                node.fields = doc.fields.clone();
                for (i, child) in doc.children.iter().enumerate() {
                    self.insert_document(view, i, child);
                }
                self.update_view_indices();
                self.signals.tree_changed.emit(view);
                self.finish_selection_change(before);
            }
        }
        true
    }

    /// Insert the payload as siblings at offset `rel` from `view`.
    ///
    /// A name collision is resolved by appending the copy suffix, except
    /// when a move would land exactly where its origin is: then the pasted
    /// node carries the temporary move tag until
    /// [`drop_delete_source`](Self::drop_delete_source) removes the origin.
    /// The last inserted node is selected and returned.
    pub fn paste_at<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        view: ViewId,
        md: &MimeData,
        action: DropAction,
        rel: usize,
    ) -> Option<ViewId> {
        const ACTION: &str = "Paste";
        if !self.contains(view) || self.reject_read_only(ACTION) || self.reject_root(view, ACTION) {
            return None;
        }
        let parent = self.parent(view)?;
        let index = match self.edit_target(&*src, view, ACTION)? {
            EditTarget::Source(sk) => src.index_in_parent(sk)?,
            EditTarget::View => self.index_in_parent(view)?,
        } + rel;

        let decoded = self.decode_payload(md, ACTION);
        let last = self.paste_into(src, parent, Some(index), decoded, action, ACTION)?;
        self.select_one(last);
        Some(last)
    }

    /// Append the payload to the children of `view`.
    pub fn paste_children<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        view: ViewId,
        md: &MimeData,
        action: DropAction,
    ) -> bool {
        const ACTION: &str = "Paste Children";
        if !self.contains(view) || self.reject_read_only(ACTION) {
            return false;
        }
        let decoded = self.decode_payload(md, ACTION);
        self.paste_into(src, view, None, decoded, action, ACTION).is_some()
    }

    /// Finish a move: delete every node named by the payload's paths, then
    /// strip the temporary move tag from any node that carries it.
    pub fn drop_delete_source<S: SourceTree<Id = Id>>(&mut self, src: &mut S, md: &MimeData) -> bool {
        const ACTION: &str = "Move";
        if self.reject_read_only(ACTION) {
            return false;
        }
        let root = self.root;
        let Some(target) = self.edit_target(&*src, root, ACTION) else {
            return false;
        };
        let paths: Vec<String> = md.text_entries().filter(|p| !p.is_empty()).collect();

        match target {
            EditTarget::Source(sroot) => {
                for origin in &paths {
                    if let Ok(id) = src.find_path(sroot, origin)
                        && id != sroot
                        && let Err(err) = src.delete(id)
                    {
                        self.emit_feedback(Feedback::error(ACTION, err));
                    }
                    if let Ok(moved) = src.find_path(sroot, &path::with_moved_tag(origin))
                        && let Some(name) = path::last_segment(origin)
                    {
                        match src.set_name(moved, &name) {
                            Ok(()) => self.needs_render = true,
                            Err(err) => self.emit_feedback(Feedback::error(ACTION, err)),
                        }
                    }
                }
                self.resync(&*src);
            }
            EditTarget::View => {
                let before = self.selected_views();
                for origin in &paths {
                    if let Ok(id) = self.find_view_path(root, origin)
                        && id != root
                    {
                        self.destroy_subtree(id);
                    }
                    if let Ok(moved) = self.find_view_path(root, &path::with_moved_tag(origin))
                        && let Some(name) = path::last_segment(origin)
                    {
                        self.nodes[moved].name = name;
                        self.needs_render = true;
                    }
                }
                self.update_view_indices();
                self.signals.tree_changed.emit(root);
                self.finish_selection_change(before);
            }
        }
        tracing::debug!(target: targets::EDIT, moved = paths.len(), "deleted move sources");
        true
    }

    /// Payload for dragging the current selection.
    pub fn drag_payload<S: SourceTree<Id = Id>>(&self, src: &S) -> MimeData {
        self.selection_mime_data(src)
    }

    /// Accept a drop on `target`.
    ///
    /// Returns the last node inserted. For a [`DropAction::MOVE`] the caller
    /// must then call [`drop_delete_source`](Self::drop_delete_source) on the
    /// view the drag started from.
    pub fn drop<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        target: ViewId,
        md: &MimeData,
        action: DropAction,
        position: DropPosition,
    ) -> Option<ViewId> {
        if action == DropAction::NONE {
            return None;
        }
        match position {
            DropPosition::AboveItem => self.paste_at(src, target, md, action, 0),
            DropPosition::BelowItem => self.paste_at(src, target, md, action, 1),
            DropPosition::OnItem => {
                if self.paste_children(src, target, md, action) {
                    self.children(target).last().copied()
                } else {
                    None
                }
            }
        }
    }

    fn decode_payload(&self, md: &MimeData, action: &'static str) -> DecodedPayload {
        let decoded = decode_nodes(md);
        for failure in &decoded.failures {
            self.emit_feedback(Feedback::error(
                action,
                format_args!("entry {}: {}", failure.entry, failure.message),
            ));
        }
        decoded
    }

    /// Insert decoded documents under `parent`, starting at `index` or
    /// appended when `None`. Returns the last view node inserted.
    fn paste_into<S: SourceTree<Id = Id>>(
        &mut self,
        src: &mut S,
        parent: ViewId,
        index: Option<usize>,
        decoded: DecodedPayload,
        drop: DropAction,
        action: &'static str,
    ) -> Option<ViewId> {
        if decoded.nodes.is_empty() {
            return None;
        }
        let target = self.edit_target(&*src, parent, action)?;
        let is_move = drop.is_move();
        let sroot = self.nodes[self.root].sync_node;
        let root = self.root;

        let mut inserted = 0;
        let mut last_name = None;
        let mut last_view = None;
        for (mut doc, origin) in decoded.nodes.into_iter().zip(decoded.paths) {
            let at = index.map_or(usize::MAX, |i| i + inserted);
            match target {
                EditTarget::Source(psrc) => {
                    let resolved = self.paste_name(&doc.name, &origin, is_move, |n| {
                        let child = src.child_by_name(psrc, n)?;
                        Some(sroot.and_then(|r| src.path_from(r, child).ok()).unwrap_or_default())
                    });
                    let Some(name) = resolved else {
                        continue;
                    };
                    doc.name = name;
                    match src.insert_document(psrc, at, &doc) {
                        Ok(_) => {
                            inserted += 1;
                            last_name = Some(doc.name);
                        }
                        Err(err) => self.emit_feedback(Feedback::error(action, err)),
                    }
                }
                EditTarget::View => {
                    if let Some(dup) = doc.duplicate_sibling_name() {
                        self.emit_feedback(Feedback::error(action, TreeError::name_conflict(dup)));
                        continue;
                    }
                    let resolved = self.paste_name(&doc.name, &origin, is_move, |n| {
                        let child = self.child_by_name(parent, n)?;
                        Some(self.view_path_from(root, child).unwrap_or_default())
                    });
                    let Some(name) = resolved else {
                        continue;
                    };
                    doc.name = name;
                    last_view = Some(self.insert_document(parent, at, &doc));
                    inserted += 1;
                }
            }
        }
        if inserted == 0 {
            return None;
        }
        tracing::debug!(target: targets::EDIT, action, inserted, is_move, "pasted nodes");

        match target {
            EditTarget::Source(_) => {
                self.resync(&*src);
                let name = last_name?;
                self.child_by_name(parent, &format!("{}{}", self.config.name_prefix, name))
            }
            EditTarget::View => {
                self.update_view_indices();
                self.signals.tree_changed.emit(parent);
                last_view
            }
        }
    }

    /// Resolve the name a pasted node takes among its new siblings.
    ///
    /// `existing` returns the path of the sibling with a given name. Returns
    /// `None`, after emitting feedback, when the same move is already in
    /// flight.
    fn paste_name(
        &self,
        name: &str,
        origin: &str,
        is_move: bool,
        existing: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        let Some(sibling) = existing(name) else {
            return Some(name.to_string());
        };
        if is_move && sibling == origin {
            let tagged = format!("{name}{}", path::TEMP_MOVED_TAG);
            if existing(&tagged).is_some() {
                self.emit_feedback(Feedback::MoveInFlight {
                    name: name.to_string(),
                });
                return None;
            }
            return Some(tagged);
        }
        Some(suffixed_name(name, &self.config.copy_suffix, |n| {
            existing(n).is_some()
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::mime::{APPLICATION_JSON, TEXT_PLAIN};
    use crate::model::{DataTree, NoSource, NodeDocument, NodeId};
    use crate::platform::MemoryClipboard;
    use crate::view::PlainTreeView;

    fn names<I: SourceId>(view: &TreeView<I>, id: ViewId) -> Vec<String> {
        view.children(id)
            .iter()
            .map(|&c| view.node(c).unwrap().name().to_string())
            .collect()
    }

    fn collect_feedback<I: SourceId>(view: &TreeView<I>) -> Arc<Mutex<Vec<Feedback>>> {
        let feedback = Arc::new(Mutex::new(Vec::new()));
        let sink = feedback.clone();
        view.signals().feedback.connect(move |fb| sink.lock().push(fb.clone()));
        feedback
    }

    /// Synced view of `{A: [B: [X], C]}`.
    fn synced() -> (DataTree, TreeView<NodeId>) {
        let mut tree = DataTree::new("Group", "A");
        let root = tree.root();
        let b = tree.add_child(root, "Group", "B").unwrap();
        tree.add_child(b, "Item", "X").unwrap();
        tree.add_child(root, "Item", "C").unwrap();
        let mut view = TreeView::new("Group", "");
        view.sync_tree(&tree, root);
        (tree, view)
    }

    #[test]
    fn test_mime_data_synced_paths() {
        let (tree, view) = synced();
        let vb = view.child_by_name(view.root(), "tv_B").unwrap();
        let vx = view.child_by_name(vb, "tv_X").unwrap();

        let mut md = MimeData::new();
        view.mime_data(&tree, vx, &mut md).unwrap();
        assert_eq!(md.entries()[0].mime_type, TEXT_PLAIN);
        assert_eq!(md.text_entries().collect::<Vec<_>>(), vec!["B/X"]);
        assert_eq!(md.entries()[1].mime_type, APPLICATION_JSON);

        let doc = NodeDocument::from_json(&md.entries()[1].data).unwrap();
        assert_eq!(doc.name, "X");
    }

    #[test]
    fn test_copy_selection_in_preorder() {
        let (tree, mut view) = synced();
        let root = view.root();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        let vc = view.child_by_name(root, "tv_C").unwrap();
        view.select_one(vc);
        view.select_action(vb, crate::view::SelectAction::ExtendOne);

        let mut clipboard = MemoryClipboard::new();
        assert!(view.copy(&tree, &mut clipboard));
        let md = clipboard.read().unwrap().unwrap();
        assert_eq!(md.text_entries().collect::<Vec<_>>(), vec!["B", "C"]);
    }

    #[test]
    fn test_copy_empty_selection() {
        let (tree, view) = synced();
        let mut clipboard = MemoryClipboard::new();
        assert!(!view.copy(&tree, &mut clipboard));
        assert!(clipboard.contents().is_none());
    }

    #[test]
    fn test_paste_at_copy_suffix() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        let mut md = MimeData::new();
        view.mime_data(&tree, vb, &mut md).unwrap();

        let pasted = view.paste_at(&mut tree, vb, &md, DropAction::COPY, 1).unwrap();
        assert_eq!(names(&view, root), vec!["tv_B", "tv_B_Copy", "tv_C"]);
        assert_eq!(view.node(pasted).unwrap().name(), "tv_B_Copy");
        assert_eq!(view.selected_views(), vec![pasted]);
        assert_eq!(names(&view, pasted), vec!["tv_X"]);
    }

    #[test]
    fn test_paste_children_appends() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        let vc = view.child_by_name(root, "tv_C").unwrap();
        let mut md = MimeData::new();
        view.mime_data(&tree, vc, &mut md).unwrap();

        assert!(view.paste_children(&mut tree, vb, &md, DropAction::COPY));
        assert_eq!(names(&view, vb), vec!["tv_X", "tv_C"]);
    }

    #[test]
    fn test_paste_assign_keeps_name() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        let vc = view.child_by_name(root, "tv_C").unwrap();
        let mut md = MimeData::new();
        view.mime_data(&tree, vb, &mut md).unwrap();

        assert!(view.paste_assign(&mut tree, vc, &md));
        let vc = view.child_by_name(root, "tv_C").unwrap();
        assert_eq!(view.node(vc).unwrap().kind().as_str(), "Group");
        assert_eq!(names(&view, vc), vec!["tv_X"]);
    }

    #[test]
    fn test_move_within_parent_uses_temp_tag() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        let vc = view.child_by_name(root, "tv_C").unwrap();
        let mut md = MimeData::new();
        view.mime_data(&tree, vb, &mut md).unwrap();

        let pasted = view.paste_at(&mut tree, vc, &md, DropAction::MOVE, 1).unwrap();
        let tagged = format!("tv_B{}", path::TEMP_MOVED_TAG);
        assert_eq!(view.node(pasted).unwrap().name(), tagged);

        assert!(view.drop_delete_source(&mut tree, &md));
        assert_eq!(names(&view, root), vec!["tv_C", "tv_B"]);
        let vb = view.child_by_name(root, "tv_B").unwrap();
        assert_eq!(names(&view, vb), vec!["tv_X"]);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_overlapping_move_rejected() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        let vc = view.child_by_name(root, "tv_C").unwrap();
        let mut md = MimeData::new();
        view.mime_data(&tree, vb, &mut md).unwrap();
        view.paste_at(&mut tree, vc, &md, DropAction::MOVE, 1).unwrap();

        let feedback = collect_feedback(&view);
        let vc = view.child_by_name(root, "tv_C").unwrap();
        assert!(view.paste_at(&mut tree, vc, &md, DropAction::MOVE, 0).is_none());
        assert_eq!(
            *feedback.lock(),
            vec![Feedback::MoveInFlight {
                name: "B".to_string()
            }]
        );
    }

    #[test]
    fn test_move_to_other_parent_keeps_name() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        let vc = view.child_by_name(root, "tv_C").unwrap();
        let mut md = MimeData::new();
        view.mime_data(&tree, vc, &mut md).unwrap();

        let moved = view
            .drop(&mut tree, vb, &md, DropAction::MOVE, DropPosition::OnItem)
            .unwrap();
        assert_eq!(view.node(moved).unwrap().name(), "tv_C");
        assert!(view.drop_delete_source(&mut tree, &md));
        assert_eq!(names(&view, root), vec!["tv_B"]);
        let vb = view.child_by_name(root, "tv_B").unwrap();
        assert_eq!(names(&view, vb), vec!["tv_X", "tv_C"]);
    }

    #[test]
    fn test_cut_then_paste_children() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        let vc = view.child_by_name(root, "tv_C").unwrap();
        view.select_one(vc);

        let mut clipboard = MemoryClipboard::new();
        assert!(view.cut(&mut tree, &mut clipboard));
        assert_eq!(names(&view, root), vec!["tv_B"]);
        assert!(view.selected_views().is_empty());

        let md = clipboard.read().unwrap().unwrap();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        assert!(view.paste_children(&mut tree, vb, &md, DropAction::COPY));
        assert_eq!(names(&view, vb), vec!["tv_X", "tv_C"]);
    }

    #[test]
    fn test_cut_nested_selection_resyncs_once() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        let vx = view.child_by_name(vb, "tv_X").unwrap();
        view.select_one(vb);
        view.select_action(vx, crate::view::SelectAction::ExtendOne);

        let resyncs = Arc::new(Mutex::new(0));
        let sink = resyncs.clone();
        view.signals().resynced.connect(move |_| *sink.lock() += 1);

        let mut clipboard = MemoryClipboard::new();
        assert!(view.cut(&mut tree, &mut clipboard));
        assert_eq!(*resyncs.lock(), 1);
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_cut_root_rejected() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        view.select_one(root);
        let feedback = collect_feedback(&view);
        let mut clipboard = MemoryClipboard::new();
        assert!(!view.cut(&mut tree, &mut clipboard));
        assert_eq!(*feedback.lock(), vec![Feedback::RootNode { action: "Cut" }]);
    }

    #[test]
    fn test_malformed_entry_reported() {
        let (mut tree, mut view) = synced();
        let root = view.root();
        let vb = view.child_by_name(root, "tv_B").unwrap();
        let mut md = MimeData::new();
        md.push_text("Q");
        md.push(APPLICATION_JSON, b"{not json".to_vec());
        view.mime_data(&tree, vb, &mut md).unwrap();

        let feedback = collect_feedback(&view);
        let pasted = view.paste_children(&mut tree, root, &md, DropAction::COPY);
        assert!(pasted);
        assert!(matches!(feedback.lock()[0], Feedback::Error { action: "Paste Children", .. }));
        assert_eq!(names(&view, root), vec!["tv_B", "tv_C", "tv_B_Copy"]);
    }

    #[test]
    fn test_unsynced_paste_and_move() {
        let mut view = PlainTreeView::new("Group", "root");
        let root = view.root();
        let a = view.add_view_child(root, "Item", "a").unwrap();
        let b = view.add_view_child(root, "Item", "b").unwrap();

        let mut md = MimeData::new();
        view.mime_data(&NoSource, a, &mut md).unwrap();
        assert_eq!(md.text_entries().collect::<Vec<_>>(), vec!["a"]);

        let copy = view.paste_at(&mut NoSource, b, &md, DropAction::COPY, 1).unwrap();
        assert_eq!(view.node(copy).unwrap().name(), "a_Copy");

        view.paste_at(&mut NoSource, b, &md, DropAction::MOVE, 1).unwrap();
        assert!(view.drop_delete_source(&mut NoSource, &md));
        assert_eq!(names(&view, root), vec!["b", "a", "a_Copy"]);
    }

    #[test]
    fn test_unsynced_paste_skips_duplicate_child_names() {
        let mut view = PlainTreeView::new("Group", "root");
        let root = view.root();
        let a = view.add_view_child(root, "Item", "a").unwrap();
        let bad = NodeDocument::new("Group", "P")
            .with_child(NodeDocument::new("Item", "x"))
            .with_child(NodeDocument::new("Item", "x"));
        let mut md = MimeData::new();
        encode_node(&mut md, "P", &bad).unwrap();
        encode_node(&mut md, "Q", &NodeDocument::new("Item", "Q")).unwrap();

        let feedback = collect_feedback(&view);
        let pasted = view.paste_at(&mut NoSource, a, &md, DropAction::COPY, 1).unwrap();
        assert_eq!(view.node(pasted).unwrap().name(), "Q");
        assert_eq!(names(&view, root), vec!["a", "Q"]);
        assert_eq!(
            *feedback.lock(),
            vec![Feedback::error("Paste", TreeError::name_conflict("x"))]
        );

        let mut single = MimeData::new();
        encode_node(&mut single, "P", &bad).unwrap();
        assert!(!view.paste_assign(&mut NoSource, a, &single));
        assert_eq!(view.node(a).unwrap().kind().as_str(), "Item");
        assert!(view.children(a).is_empty());
    }

    #[test]
    fn test_unsynced_move_reports_lost_selection() {
        let mut view = PlainTreeView::new("Group", "root");
        let root = view.root();
        let a = view.add_view_child(root, "Group", "a").unwrap();
        let inner = view.add_view_child(a, "Item", "inner").unwrap();
        let b = view.add_view_child(root, "Item", "b").unwrap();
        let mut md = MimeData::new();
        view.mime_data(&NoSource, a, &mut md).unwrap();
        view.paste_children(&mut NoSource, b, &md, DropAction::MOVE);
        view.select_one(inner);

        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = emitted.clone();
        view.signals()
            .selection_changed
            .connect(move |sel| sink.lock().push(sel.clone()));

        assert!(view.drop_delete_source(&mut NoSource, &md));
        assert!(!view.contains(inner));
        assert!(view.selected_views().is_empty());
        assert_eq!(*emitted.lock(), vec![Vec::<ViewId>::new()]);
    }
}

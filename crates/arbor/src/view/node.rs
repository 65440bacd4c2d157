use slotmap::new_key_type;

use crate::model::{FieldMap, NodeKind};

new_key_type! {
    /// Handle to a node of a [`TreeView`](super::TreeView).
    pub struct ViewId;
}

/// One node of a view tree.
///
/// View nodes are created and destroyed by their [`TreeView`](super::TreeView);
/// this type only exposes their state.
#[derive(Debug, Clone)]
pub struct ViewNode<Id> {
    pub(crate) name: String,
    pub(crate) text: String,
    pub(crate) kind: NodeKind,
    pub(crate) fields: FieldMap,
    pub(crate) view_index: usize,
    pub(crate) closed: bool,
    pub(crate) selected: bool,
    pub(crate) read_only: bool,
    pub(crate) sync_node: Option<Id>,
    pub(crate) parent: Option<ViewId>,
    pub(crate) children: Vec<ViewId>,
}

impl<Id> ViewNode<Id> {
    pub(crate) fn new(kind: NodeKind, name: String, parent: Option<ViewId>) -> Self {
        Self {
            name,
            text: String::new(),
            kind,
            fields: FieldMap::new(),
            view_index: 0,
            closed: false,
            selected: false,
            read_only: false,
            sync_node: None,
            parent,
            children: Vec::new(),
        }
    }

    /// Name, unique among siblings. Synced nodes derive it from their source node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit label text, empty if unset.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Node kind, mirrored from the source node when synced.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Payload of an unsynced node.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Pre-order position assigned by the last reconciliation or edit.
    pub fn view_index(&self) -> usize {
        self.view_index
    }

    /// Whether the node is collapsed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the node is selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the node is read-only.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The source node this view mirrors.
    pub fn sync_node(&self) -> Option<&Id> {
        self.sync_node.as_ref()
    }

    /// The parent view node.
    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    /// Child view nodes in order.
    pub fn children(&self) -> &[ViewId] {
        &self.children
    }
}

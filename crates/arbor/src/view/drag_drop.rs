//! Drag and drop vocabulary for tree views.
//!
//! A drag out of a tree view carries the mime payload of the selected nodes
//! (see [`TreeView::drag_payload`](super::TreeView::drag_payload)). The drop
//! target inserts it relative to the item under the cursor according to a
//! [`DropPosition`], then, for a [`DropAction::MOVE`], the source view calls
//! [`TreeView::drop_delete_source`](super::TreeView::drop_delete_source) with
//! the same payload.

/// Actions that can be performed during a drop operation.
///
/// These flags indicate what actions are supported by the drag source
/// and what action was performed by the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DropAction(u8);

impl DropAction {
    /// No action (drop not allowed).
    pub const NONE: Self = Self(0);
    /// Copy the data.
    pub const COPY: Self = Self(1 << 0);
    /// Move the data (source deletes the original afterwards).
    pub const MOVE: Self = Self(1 << 1);
    /// Copy and move.
    pub const ALL: Self = Self(Self::COPY.0 | Self::MOVE.0);

    /// Returns true if this action set contains another action.
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Whether a drop with this action moves rather than copies.
    ///
    /// Only a pure move counts; a set offering both resolves to a copy.
    pub fn is_move(self) -> bool {
        self == Self::MOVE
    }

    /// Returns the preferred action from this set.
    ///
    /// Priority: Copy > Move > None
    pub fn preferred(self) -> Self {
        if self.contains(Self::COPY) {
            Self::COPY
        } else if self.contains(Self::MOVE) {
            Self::MOVE
        } else {
            Self::NONE
        }
    }
}

impl std::ops::BitOr for DropAction {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for DropAction {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

/// Where a drop lands relative to the item under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropPosition {
    /// Insert before the item, as a sibling.
    AboveItem,
    /// Insert after the item, as a sibling.
    BelowItem,
    /// Append to the item's children.
    OnItem,
}

impl DropPosition {
    /// Classify a drop by its vertical offset within an item row.
    ///
    /// The top and bottom quarters of the row insert above and below; the
    /// middle drops onto the item.
    pub fn from_row_offset(offset: f32, row_height: f32) -> Self {
        let margin = row_height / 4.0;
        if offset < margin {
            Self::AboveItem
        } else if offset > row_height - margin {
            Self::BelowItem
        } else {
            Self::OnItem
        }
    }
}

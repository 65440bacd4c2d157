//! Commonly used types.
//!
//! ```ignore
//! use arbor::prelude::*;
//! ```

// ============================================================================
// Signals
// ============================================================================

pub use arbor_core::{ConnectionId, Signal};

// ============================================================================
// Source Trees
// ============================================================================

pub use crate::model::{DataTree, KindRegistry, NodeDocument, NodeId, NodeKind, SourceTree};

// ============================================================================
// Views
// ============================================================================

pub use crate::view::{
    DropAction, DropPosition, NewItems, PlainTreeView, SelectAction, SelectionMode, TreeView,
    TreeViewConfig, ViewId,
};

// ============================================================================
// Transfer
// ============================================================================

pub use crate::mime::MimeData;
pub use crate::platform::{MemoryClipboard, MimeClipboard};

// ============================================================================
// Errors
// ============================================================================

pub use crate::error::{Feedback, TreeError, TreeResult};

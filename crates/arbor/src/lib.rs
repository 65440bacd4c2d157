//! Arbor - editable tree views kept in sync with external data trees.
//!
//! The crate is split into:
//!
//! - [`model`]: the source side, a [`SourceTree`](model::SourceTree)
//!   capability trait with an arena-backed [`DataTree`](model::DataTree)
//! - [`view`]: [`TreeView`](view::TreeView), its reconciler, selection and
//!   structural edits
//! - [`mime`]: the transfer payload format used by clipboard and drag-and-drop
//! - [`platform`]: clipboard backends
//!
//! # Example
//!
//! ```
//! use arbor::prelude::*;
//!
//! let mut tree = DataTree::new("Group", "A");
//! let root = tree.root();
//! tree.add_child(root, "Item", "B").unwrap();
//! tree.add_child(root, "Item", "C").unwrap();
//!
//! let mut view = TreeView::new("Group", "");
//! view.signals().resynced.connect(|root| {
//!     println!("view {:?} resynced", root);
//! });
//! view.sync_tree(&tree, root);
//!
//! let b = view.child_by_name(view.root(), "tv_B").unwrap();
//! view.select_one(b);
//! view.delete_node(&mut tree, b);
//! assert_eq!(view.selected_views().len(), 1);
//! ```

pub mod error;
pub mod mime;
pub mod model;
pub mod platform;
pub mod prelude;
pub mod view;

pub use arbor_core::{
    BlinkTarget, ConnectionId, CursorBlinker, CursorSprite, DebugTree, Signal, TreeFormatOptions,
    TreeFormatter,
};
pub use error::{Feedback, TreeError, TreeResult};

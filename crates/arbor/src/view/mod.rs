//! Tree views mirroring a source tree.
//!
//! A [`TreeView`] holds its own node hierarchy. After
//! [`sync_tree`](TreeView::sync_tree) binds it to a node of a
//! [`SourceTree`](crate::model::SourceTree), every view node carries a
//! handle to its source node and is named `tv_<source name>`. Calling
//! [`resync`](TreeView::resync) reconciles the view with the source using a
//! minimal diff, so open/closed state and selection survive edits.
//!
//! Edits made through the view (insert, delete, duplicate, paste, drop) go
//! to the source tree when the node is synced and to the view tree itself
//! otherwise.
//!
//! # Example
//!
//! ```
//! use arbor::model::{DataTree, SourceTree};
//! use arbor::view::{NewItems, TreeView};
//!
//! let mut tree = DataTree::new("Group", "A");
//! let root = tree.root();
//! tree.add_child(root, "Item", "B").unwrap();
//!
//! let mut view = TreeView::new("Group", "");
//! view.sync_tree(&tree, root);
//! let b = view.child_by_name(view.root(), "tv_B").unwrap();
//!
//! view.insert_after(&mut tree, b, &NewItems::single("Item"));
//! assert_eq!(tree.children(root).len(), 2);
//! ```

mod config;
mod drag_drop;
mod edit;
mod node;
mod selection;
mod sync;
mod transfer;
mod tree_view;

pub use config::TreeViewConfig;
pub use drag_drop::{DropAction, DropPosition};
pub use edit::NewItems;
pub use node::{ViewId, ViewNode};
pub use selection::{SelectAction, SelectionMode};
pub use tree_view::{PlainTreeView, TreeView, TreeViewSignals};

//! The source side of tree synchronization.
//!
//! - [`SourceTree`]: the capability interface a tree view mirrors and edits
//! - [`DataTree`]: an arena-backed implementation
//! - [`NodeDocument`]: detached, serializable subtrees
//! - [`KindRegistry`]: node kinds and their constructors
//! - [`path`]: path addressing helpers

mod data_tree;
mod document;
mod kind;
pub mod path;
mod source;

pub use data_tree::{DataTree, LABEL_FIELD, NodeId, READ_ONLY_FIELD};
pub use document::NodeDocument;
pub use kind::{FieldMap, KindConstructor, KindRegistry, NodeKind};
pub use source::{NoSource, SourceId, SourceTree, Unbound};

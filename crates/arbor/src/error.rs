//! Error and feedback types for tree operations.
//!
//! Two channels exist. [`TreeError`] is returned from fallible source-tree and
//! codec calls. [`Feedback`] is the user-facing, non-fatal message a
//! [`TreeView`](crate::view::TreeView) emits through its `feedback` signal when
//! an edit is rejected up-front or one item of a batch fails.

use std::fmt;

use crate::platform::ClipboardError;

/// Result type alias for tree operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;

/// Errors that can occur in tree operations.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The node handle does not refer to a live node.
    #[error("Invalid or stale node handle")]
    InvalidNode,

    /// A sibling with this name already exists.
    #[error("A sibling named '{name}' already exists")]
    NameConflict { name: String },

    /// No node is reachable at the given path.
    #[error("No node found at path '{path}'")]
    PathNotFound { path: String },

    /// The node is not below the given root.
    #[error("Node is not a descendant of the given root")]
    NotDescendant,

    /// The operation is not allowed on a root node.
    #[error("Cannot {action} the root node")]
    RootNode { action: &'static str },

    /// The node kind is not registered.
    #[error("Unknown node kind '{kind}'")]
    UnknownKind { kind: String },

    /// A structured document payload could not be decoded.
    #[error("Failed to decode node document: {0}")]
    Decode(#[from] serde_json::Error),

    /// Clipboard access failed.
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// Configuration could not be parsed.
    #[error("Invalid tree view configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl TreeError {
    /// Create a name conflict error.
    pub fn name_conflict(name: impl Into<String>) -> Self {
        Self::NameConflict { name: name.into() }
    }

    /// Create a path lookup error.
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create an unknown kind error.
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }
}

/// User-facing feedback for rejected or partially failed edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// The action is not allowed on the root of the tree.
    RootNode { action: &'static str },
    /// The tree is read-only.
    ReadOnly { action: &'static str },
    /// One item of an action failed; the rest of the batch still ran.
    Error { action: &'static str, message: String },
    /// A move of this node is already in flight.
    MoveInFlight { name: String },
}

impl Feedback {
    pub(crate) fn error(action: &'static str, err: impl fmt::Display) -> Self {
        Self::Error {
            action,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNode { action } => {
                write!(f, "{action}: cannot perform this action on the root of the tree")
            }
            Self::ReadOnly { action } => write!(f, "{action}: the tree is read-only"),
            Self::Error { action, message } => write!(f, "{action}: {message}"),
            Self::MoveInFlight { name } => {
                write!(f, "Move: '{name}' is already being moved")
            }
        }
    }
}

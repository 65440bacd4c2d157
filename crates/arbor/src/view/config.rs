//! Tree view configuration.
//!
//! ```
//! use arbor::view::TreeViewConfig;
//!
//! let config = TreeViewConfig::from_toml_str("open_depth = 2").unwrap();
//! assert_eq!(config.open_depth, 2);
//! assert_eq!(config.name_prefix, "tv_");
//! ```

use serde::{Deserialize, Serialize};

use super::selection::SelectionMode;
use crate::error::TreeResult;

/// Settings for a [`TreeView`](super::TreeView).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeViewConfig {
    /// Depth from which nodes start collapsed on the initial build.
    pub open_depth: usize,
    /// Prefix of the view name derived from a source node name.
    pub name_prefix: String,
    /// Suffix appended to the name of a copy that collides with a sibling.
    pub copy_suffix: String,
    /// How clicks change the selection.
    pub selection_mode: SelectionMode,
}

impl Default for TreeViewConfig {
    fn default() -> Self {
        Self {
            open_depth: 4,
            name_prefix: "tv_".into(),
            copy_suffix: "_Copy".into(),
            selection_mode: SelectionMode::ExtendedSelection,
        }
    }
}

impl TreeViewConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> TreeResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Set the open depth.
    pub fn with_open_depth(mut self, depth: usize) -> Self {
        self.open_depth = depth;
        self
    }

    /// Set the derived name prefix.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Set the copy suffix.
    pub fn with_copy_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.copy_suffix = suffix.into();
        self
    }

    /// Set the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }
}

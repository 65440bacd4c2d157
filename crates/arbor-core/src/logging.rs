//! Logging and debugging facilities for Arbor.
//!
//! This module provides:
//! - Target names for the `tracing` instrumentation used across the workspace
//! - Debug visualization for any tree that implements [`DebugTree`]
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Arbor uses the `tracing` crate for instrumentation. To see logs, install a
//! tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // Your application code...
//! }
//! ```
//!
//! # Debug Visualization
//!
//! ```ignore
//! use arbor_core::logging::TreeFormatter;
//!
//! let text = TreeFormatter::new().format_subtree(&tree, tree.root());
//! println!("{text}");
//! ```

use std::fmt::{self, Write as FmtWrite};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "arbor_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "arbor_core::signal";
    /// Cursor blink service target.
    pub const BLINK: &str = "arbor_core::blink";
    /// View reconciliation target.
    pub const SYNC: &str = "arbor::sync";
    /// Structural edit operations target.
    pub const EDIT: &str = "arbor::edit";
    /// Clipboard and drag payload codec target.
    pub const MIME: &str = "arbor::mime";
    /// Source tree target.
    pub const SOURCE: &str = "arbor::source";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to show node kinds.
    pub show_kinds: bool,
    /// Whether to show per-node details (view state, field names...).
    pub show_details: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_kinds: true,
            show_details: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_details: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_kinds: false,
            show_details: false,
            ..Default::default()
        }
    }
}

/// A tree that can be rendered by [`TreeFormatter`].
pub trait DebugTree {
    /// Handle type addressing a node of the tree.
    type Id: Copy + fmt::Debug;

    /// The node's name, or `None` if the handle is stale.
    fn debug_name(&self, id: Self::Id) -> Option<String>;

    /// The node's kind (type name).
    fn debug_kind(&self, id: Self::Id) -> Option<String>;

    /// The node's children in order.
    fn debug_children(&self, id: Self::Id) -> Vec<Self::Id>;

    /// Extra per-node detail shown with [`TreeFormatOptions::detailed`].
    fn debug_detail(&self, _id: Self::Id) -> Option<String> {
        None
    }
}

/// Debug utility for visualizing trees.
#[derive(Debug, Clone, Default)]
pub struct TreeFormatter {
    options: TreeFormatOptions,
}

impl TreeFormatter {
    /// Create a new formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a subtree starting from a specific node.
    pub fn format_subtree<T: DebugTree>(&self, tree: &T, root: T::Id) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.format_subtree_into(tree, root, 0, true, &mut output);
        output
    }

    fn format_subtree_into<T: DebugTree>(
        &self,
        tree: &T,
        id: T::Id,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> fmt::Result {
        if let Some(max) = self.options.max_depth
            && depth > max
        {
            return Ok(());
        }

        let Some(name) = tree.debug_name(id) else {
            return Ok(());
        };

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(if name.is_empty() { "(unnamed)" } else { &name });

        if self.options.show_ids {
            write!(output, " [{:?}]", id)?;
        }

        if self.options.show_kinds
            && let Some(kind) = tree.debug_kind(id)
        {
            write!(output, " ({})", kind)?;
        }

        if self.options.show_details
            && let Some(detail) = tree.debug_detail(id)
        {
            write!(output, " {{{}}}", detail)?;
        }

        output.push('\n');

        let children = tree.debug_children(id);
        let child_count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_subtree_into(tree, child, depth + 1, i + 1 == child_count, output)?;
        }

        Ok(())
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "arbor::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

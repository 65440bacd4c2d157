//! Path addressing for tree nodes.
//!
//! A path names a node by the `/`-joined names of the nodes strictly below a
//! chosen root, down to and including the node. The root itself has the
//! empty path. A `/` or `\` inside a name is escaped with a backslash.
//!
//! Paths identify a node only at the moment they are computed. A rename or
//! reorder elsewhere can make a path resolve to nothing, or to a different
//! node, so they are resolved immediately after being read.

use std::borrow::Cow;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Escape character inside path segments.
pub const ESCAPE: char = '\\';

/// Suffix marking a node pasted during a move whose destination path equals
/// its origin path. The source is deleted right after the paste and the tag
/// removed again.
pub const TEMP_MOVED_TAG: &str = "__tree_view_temp_moved";

/// Escape a node name for use as a path segment.
pub fn escape_name(name: &str) -> Cow<'_, str> {
    if !name.contains([SEPARATOR, ESCAPE]) {
        return Cow::Borrowed(name);
    }
    let mut out = String::with_capacity(name.len() + 2);
    for ch in name.chars() {
        if ch == SEPARATOR || ch == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

/// Join raw names into a path.
pub fn join<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for (i, name) in names.into_iter().enumerate() {
        if i > 0 {
            path.push(SEPARATOR);
        }
        path.push_str(&escape_name(name.as_ref()));
    }
    path
}

/// Split a path into unescaped names. The empty path has no segments.
pub fn split(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(ch) = chars.next() {
        match ch {
            ESCAPE => match chars.next() {
                Some(next) => current.push(next),
                // A trailing lone escape is kept literally.
                None => current.push(ESCAPE),
            },
            SEPARATOR => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    segments.push(current);
    segments
}

/// The unescaped name of the last segment.
pub fn last_segment(path: &str) -> Option<String> {
    split(path).pop()
}

/// The path of a node pasted under the temporary moved tag.
pub fn with_moved_tag(path: &str) -> String {
    format!("{path}{TEMP_MOVED_TAG}")
}

/// A name with the temporary moved tag removed, if it carries one.
pub fn strip_moved_tag(name: &str) -> Option<&str> {
    name.strip_suffix(TEMP_MOVED_TAG)
}

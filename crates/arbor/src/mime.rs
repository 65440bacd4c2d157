//! Mime interchange codec for clipboard and drag-drop payloads.
//!
//! A payload is an ordered list of typed byte blobs. Each transferred node
//! contributes two entries: a [`TEXT_PLAIN`] entry holding its path, followed
//! by an [`APPLICATION_JSON`] entry holding its [`NodeDocument`]. The
//! transport must preserve entry order.
//!
//! Decoding never aborts: a malformed document entry is skipped and
//! reported in [`DecodedPayload::failures`] while the remaining entries are
//! still decoded.

use serde::{Deserialize, Serialize};

use arbor_core::logging::targets;

use crate::error::TreeResult;
use crate::model::NodeDocument;

/// Plain text MIME type. Carries node paths.
pub const TEXT_PLAIN: &str = "text/plain";

/// JSON MIME type. Carries node documents.
pub const APPLICATION_JSON: &str = "application/json";

/// One typed entry of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeEntry {
    /// Declared content type.
    pub mime_type: String,
    /// Raw content.
    pub data: Vec<u8>,
}

/// An ordered list of typed entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeData {
    entries: Vec<MimeEntry>,
}

impl MimeData {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, mime_type: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.entries.push(MimeEntry {
            mime_type: mime_type.into(),
            data: data.into(),
        });
    }

    /// Append a [`TEXT_PLAIN`] entry.
    pub fn push_text(&mut self, text: &str) {
        self.push(TEXT_PLAIN, text.as_bytes());
    }

    /// Entries in order.
    pub fn entries(&self) -> &[MimeEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the payload has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry has this type.
    pub fn has_format(&self, mime_type: &str) -> bool {
        self.entries.iter().any(|e| e.mime_type == mime_type)
    }

    /// The [`TEXT_PLAIN`] entries decoded as UTF-8, in order.
    pub fn text_entries(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .filter(|e| e.mime_type == TEXT_PLAIN)
            .map(|e| String::from_utf8_lossy(&e.data).into_owned())
    }

    /// Append all entries of `other`.
    pub fn extend(&mut self, other: MimeData) {
        self.entries.extend(other.entries);
    }
}

impl FromIterator<MimeEntry> for MimeData {
    fn from_iter<I: IntoIterator<Item = MimeEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Append the two entries describing one node.
pub fn encode_node(md: &mut MimeData, path: &str, doc: &NodeDocument) -> TreeResult<()> {
    let json = doc.to_json()?;
    md.push_text(path);
    md.push(APPLICATION_JSON, json);
    Ok(())
}

/// A document entry that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    /// Position of the entry in the payload.
    pub entry: usize,
    /// Decoder message.
    pub message: String,
}

/// Result of decoding a payload.
///
/// `nodes` and `paths` are parallel: `paths[i]` is the origin path of
/// `nodes[i]`, or empty if the document entry had no path entry before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPayload {
    /// Decoded subtrees in payload order.
    pub nodes: Vec<NodeDocument>,
    /// Origin path of each decoded subtree.
    pub paths: Vec<String>,
    /// Entries that were skipped.
    pub failures: Vec<DecodeFailure>,
}

impl DecodedPayload {
    /// Iterate over `(document, origin path)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeDocument, &str)> {
        self.nodes.iter().zip(self.paths.iter().map(String::as_str))
    }
}

/// Decode every node in a payload.
///
/// Each document entry is paired with the nearest preceding path entry that
/// no other document has claimed. Entries of other types are ignored.
pub fn decode_nodes(md: &MimeData) -> DecodedPayload {
    let mut out = DecodedPayload::default();
    let mut pending: Option<String> = None;

    for (i, entry) in md.entries().iter().enumerate() {
        match entry.mime_type.as_str() {
            TEXT_PLAIN => {
                let path = String::from_utf8_lossy(&entry.data).into_owned();
                if let Some(unused) = pending.replace(path) {
                    tracing::trace!(target: targets::MIME, path = %unused, "path entry without document");
                }
            }
            APPLICATION_JSON => {
                let path = pending.take().unwrap_or_default();
                match NodeDocument::from_json(&entry.data) {
                    Ok(doc) => {
                        out.nodes.push(doc);
                        out.paths.push(path);
                    }
                    Err(err) => {
                        tracing::warn!(target: targets::MIME, entry = i, %path, error = %err, "skipping malformed node document");
                        out.failures.push(DecodeFailure {
                            entry: i,
                            message: err.to_string(),
                        });
                    }
                }
            }
            other => {
                tracing::trace!(target: targets::MIME, mime_type = other, "ignoring entry");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> NodeDocument {
        NodeDocument::new("Item", name).with_child(NodeDocument::new("Item", format!("{name}-kid")))
    }

    #[test]
    fn test_encode_layout() {
        let mut md = MimeData::new();
        encode_node(&mut md, "A/B", &doc("B")).unwrap();
        assert_eq!(md.len(), 2);
        assert_eq!(md.entries()[0].mime_type, TEXT_PLAIN);
        assert_eq!(md.entries()[0].data, b"A/B");
        assert_eq!(md.entries()[1].mime_type, APPLICATION_JSON);
        assert_eq!(md.text_entries().collect::<Vec<_>>(), vec!["A/B"]);
    }

    #[test]
    fn test_round_trip() {
        let mut md = MimeData::new();
        encode_node(&mut md, "A/B", &doc("B")).unwrap();
        encode_node(&mut md, "A/C", &doc("C")).unwrap();

        let decoded = decode_nodes(&md);
        assert_eq!(decoded.nodes, vec![doc("B"), doc("C")]);
        assert_eq!(decoded.paths, vec!["A/B", "A/C"]);
        assert!(decoded.failures.is_empty());
    }

    #[test]
    fn test_malformed_entry_skipped() {
        let mut md = MimeData::new();
        encode_node(&mut md, "A/B", &doc("B")).unwrap();
        md.push_text("A/bad");
        md.push(APPLICATION_JSON, b"{not json".to_vec());
        encode_node(&mut md, "A/C", &doc("C")).unwrap();

        let decoded = decode_nodes(&md);
        assert_eq!(decoded.nodes.len(), 2);
        assert_eq!(decoded.paths, vec!["A/B", "A/C"]);
        assert_eq!(decoded.failures.len(), 1);
        assert_eq!(decoded.failures[0].entry, 3);
    }

    #[test]
    fn test_document_without_path() {
        let mut md = MimeData::new();
        md.push(APPLICATION_JSON, doc("X").to_json().unwrap());
        md.push("image/png", vec![0u8, 1, 2]);

        let decoded = decode_nodes(&md);
        let pairs: Vec<_> = decoded.iter().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.name, "X");
        assert_eq!(pairs[0].1, "");
    }

    #[test]
    fn test_empty_payload() {
        let decoded = decode_nodes(&MimeData::new());
        assert_eq!(decoded, DecodedPayload::default());
    }
}

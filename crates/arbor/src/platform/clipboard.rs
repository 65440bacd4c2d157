//! Clipboard backends for mime payloads.
//!
//! Tree views copy and paste through the [`MimeClipboard`] trait so the same
//! edit code works against the system clipboard and against an in-process
//! one. Two backends ship:
//!
//! - [`MemoryClipboard`]: keeps the payload in memory, entry types intact
//! - [`SystemClipboard`]: the operating system clipboard via `arboard`
//!   (feature `system-clipboard`)
//!
//! # Platform Notes
//!
//! The system clipboard only carries text, so [`SystemClipboard`] stores the
//! whole payload as one JSON envelope string. Entry data must be UTF-8, which
//! node paths and documents always are; other entries are rejected. Text placed on the clipboard by
//! other applications reads back as a single `text/plain` entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mime::{MimeData, MimeEntry};

/// Error type for clipboard operations.
#[derive(Debug)]
pub struct ClipboardError {
    message: String,
}

impl ClipboardError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clipboard error: {}", self.message)
    }
}

impl std::error::Error for ClipboardError {}

#[cfg(feature = "system-clipboard")]
impl From<arboard::Error> for ClipboardError {
    fn from(err: arboard::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for ClipboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A clipboard that holds mime payloads.
pub trait MimeClipboard {
    /// Replace the clipboard contents.
    fn write(&mut self, data: MimeData) -> Result<(), ClipboardError>;

    /// Read the clipboard contents. `Ok(None)` means the clipboard is empty.
    fn read(&mut self) -> Result<Option<MimeData>, ClipboardError>;
}

/// An in-process clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<MimeData>,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current contents.
    pub fn contents(&self) -> Option<&MimeData> {
        self.contents.as_ref()
    }

    /// Empty the clipboard.
    pub fn clear(&mut self) {
        self.contents = None;
    }
}

impl MimeClipboard for MemoryClipboard {
    fn write(&mut self, data: MimeData) -> Result<(), ClipboardError> {
        self.contents = Some(data);
        Ok(())
    }

    fn read(&mut self) -> Result<Option<MimeData>, ClipboardError> {
        Ok(self.contents.clone())
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "arbor-mime")]
    entries: Vec<EnvelopeEntry>,
}

#[derive(Serialize, Deserialize)]
struct EnvelopeEntry {
    #[serde(rename = "type")]
    mime_type: String,
    data: String,
}

/// Pack a payload into one text string.
fn encode_envelope(data: &MimeData) -> Result<String, ClipboardError> {
    let entries = data
        .entries()
        .iter()
        .map(|e| {
            let text = std::str::from_utf8(&e.data).map_err(|err| {
                ClipboardError::new(format!("{} entry is not UTF-8: {err}", e.mime_type))
            })?;
            Ok(EnvelopeEntry {
                mime_type: e.mime_type.clone(),
                data: text.to_string(),
            })
        })
        .collect::<Result<Vec<_>, ClipboardError>>()?;
    Ok(serde_json::to_string(&Envelope { entries })?)
}

/// Unpack a text string. Anything that is not an envelope is plain text.
fn decode_envelope(text: &str) -> MimeData {
    match serde_json::from_str::<Envelope>(text) {
        Ok(envelope) => envelope
            .entries
            .into_iter()
            .map(|e| MimeEntry {
                mime_type: e.mime_type,
                data: e.data.into_bytes(),
            })
            .collect(),
        Err(_) => {
            let mut md = MimeData::new();
            md.push_text(text);
            md
        }
    }
}

/// The operating system clipboard.
///
/// # Thread Safety
///
/// Clipboard access should happen on the UI thread for best compatibility
/// across platforms.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    /// Open the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard cannot be accessed, which can happen
    /// if no display is available or another process holds it.
    pub fn new() -> Result<Self, ClipboardError> {
        Ok(Self {
            inner: arboard::Clipboard::new()?,
        })
    }
}

#[cfg(feature = "system-clipboard")]
impl MimeClipboard for SystemClipboard {
    fn write(&mut self, data: MimeData) -> Result<(), ClipboardError> {
        let text = encode_envelope(&data)?;
        self.inner.set_text(text).map_err(Into::into)
    }

    fn read(&mut self) -> Result<Option<MimeData>, ClipboardError> {
        match self.inner.get_text() {
            Ok(text) => Ok(Some(decode_envelope(&text))),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(feature = "system-clipboard")]
impl fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemClipboard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::{APPLICATION_JSON, TEXT_PLAIN};

    fn payload() -> MimeData {
        let mut md = MimeData::new();
        md.push_text("A/B");
        md.push(APPLICATION_JSON, br#"{"kind":"Item","name":"B"}"#.to_vec());
        md
    }

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.read().unwrap(), None);

        clipboard.write(payload()).unwrap();
        assert_eq!(clipboard.read().unwrap(), Some(payload()));
        assert_eq!(clipboard.contents().map(MimeData::len), Some(2));

        clipboard.clear();
        assert!(clipboard.contents().is_none());
    }

    #[test]
    fn test_envelope_keeps_order_and_types() {
        let text = encode_envelope(&payload()).unwrap();
        assert_eq!(decode_envelope(&text), payload());
    }

    #[test]
    fn test_envelope_rejects_binary_entry() {
        let mut md = payload();
        md.push("application/octet-stream", vec![0xff, 0xfe, 0x00]);
        let err = encode_envelope(&md).unwrap_err();
        assert!(err.to_string().contains("application/octet-stream"));
    }

    #[test]
    fn test_foreign_text_is_plain() {
        let md = decode_envelope("hello");
        assert_eq!(md.len(), 1);
        assert_eq!(md.entries()[0].mime_type, TEXT_PLAIN);
        assert_eq!(md.entries()[0].data, b"hello");
    }

    #[test]
    fn test_clipboard_error_display() {
        let error = ClipboardError::new("test error");
        assert_eq!(error.to_string(), "clipboard error: test error");
    }

    #[cfg(feature = "system-clipboard")]
    #[test]
    fn test_system_clipboard_creation() {
        // May fail without a display; only check it does not panic.
        let _ = SystemClipboard::new();
    }
}

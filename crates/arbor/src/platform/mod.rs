//! Platform services.
//!
//! # Clipboard
//!
//! ```ignore
//! use arbor::platform::{MimeClipboard, SystemClipboard};
//!
//! let mut clipboard = SystemClipboard::new()?;
//! view.copy(&tree, &mut clipboard);
//! ```

mod clipboard;

pub use clipboard::{ClipboardError, MemoryClipboard, MimeClipboard};

#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;

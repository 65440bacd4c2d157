//! Core systems for Arbor.
//!
//! This crate provides the foundational components shared by the Arbor tree
//! widgets:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Logging**: `tracing` targets, tree debug formatting, performance spans
//! - **Cursor Animation**: A blink service with an explicit start/stop lifecycle
//!
//! # Signal/Slot Example
//!
//! ```
//! use arbor_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```

pub mod blink;
mod error;
pub mod logging;
pub mod signal;

pub use blink::{BlinkTarget, CursorBlinker, CursorSprite};
pub use error::{BlinkError, CoreError, Result};
pub use logging::{DebugTree, PerfSpan, TreeFormatOptions, TreeFormatter, TreeStyle};
pub use signal::{BlockedScope, ConnectionId, Signal};

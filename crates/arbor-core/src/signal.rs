//! Signal/slot notifications for Arbor.
//!
//! Tree views publish "something changed here" notifications through
//! [`Signal`]s. Every connected slot is invoked synchronously on the thread
//! that emits, which is the thread that owns the tree being edited.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//!
//! # Blocking
//!
//! A signal can be blocked temporarily with [`Signal::set_blocked`] or the
//! scoped [`Signal::blocked_scope`]. Batch operations use this to collapse
//! many fine-grained notifications into a single coarse one.
//!
//! # Example
//!
//! ```
//! use arbor_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//! text_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` will do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Block the signal until the returned guard is dropped.
    ///
    /// The previous blocked state is restored afterwards, so scopes nest.
    pub fn blocked_scope(&self) -> BlockedScope<'_, Args> {
        let was_blocked = self.blocked.swap(true, Ordering::SeqCst);
        BlockedScope {
            signal: self,
            was_blocked,
        }
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// Slots are collected before any of them runs, so a slot may connect or
    /// disconnect on the same signal without deadlocking.
    #[tracing::instrument(skip_all, target = "arbor_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

/// Guard returned by [`Signal::blocked_scope`].
pub struct BlockedScope<'a, Args: Clone + Send + 'static> {
    signal: &'a Signal<Args>,
    was_blocked: bool,
}

impl<Args: Clone + Send + 'static> Drop for BlockedScope<'_, Args> {
    fn drop(&mut self) {
        self.signal.set_blocked(self.was_blocked);
    }
}

static_assertions::assert_impl_all!(Signal<u64>: Send, Sync);

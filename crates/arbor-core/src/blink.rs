//! Cursor animation service.
//!
//! A [`CursorBlinker`] owns a background thread that periodically toggles the
//! visibility of whatever text cursor currently has focus. There is one
//! blinker per application, created and stopped by the application and handed
//! to the widgets that need it.
//!
//! The blinker only holds a weak reference to its target, so a widget can be
//! torn down while the timer is armed: the next tick notices the target is
//! gone and does nothing.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use arbor_core::blink::{CursorBlinker, CursorSprite};
//!
//! let blinker = CursorBlinker::new();
//! let sprite = Arc::new(CursorSprite::new());
//! sprite.set_focused(true);
//! blinker.set_target(&sprite);
//!
//! blinker.start(Duration::from_millis(500)).unwrap();
//! blinker.stop();
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;

use crate::error::BlinkError;
use crate::logging::targets;

/// Something the blinker can toggle.
pub trait BlinkTarget: Send + Sync {
    /// Called once per blink interval.
    fn blink(&self);
}

struct BlinkState {
    target: Mutex<Option<Weak<dyn BlinkTarget>>>,
    ticks: AtomicU64,
}

impl BlinkState {
    fn tick(&self) -> bool {
        let target = {
            let mut slot = self.target.lock();
            match slot.as_ref().map(Weak::upgrade) {
                Some(Some(target)) => target,
                Some(None) => {
                    tracing::trace!(target: targets::BLINK, "blink target dropped");
                    *slot = None;
                    return false;
                }
                None => return false,
            }
        };
        target.blink();
        self.ticks.fetch_add(1, Ordering::Relaxed);
        true
    }
}

/// The cursor animation service.
pub struct CursorBlinker {
    state: Arc<BlinkState>,
    running: Arc<AtomicBool>,
    stop_tx: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Default for CursorBlinker {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorBlinker {
    /// Create a stopped blinker with no target.
    pub fn new() -> Self {
        Self {
            state: Arc::new(BlinkState {
                target: Mutex::new(None),
                ticks: AtomicU64::new(0),
            }),
            running: Arc::new(AtomicBool::new(false)),
            stop_tx: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Start ticking every `interval` on a dedicated thread.
    pub fn start(&self, interval: Duration) -> Result<(), BlinkError> {
        if interval.is_zero() {
            return Err(BlinkError::ZeroInterval);
        }
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(BlinkError::AlreadyRunning);
        }

        let (tx, rx) = bounded(1);
        let state = self.state.clone();
        let running = self.running.clone();

        let spawned = thread::Builder::new()
            .name("arbor-cursor-blink".into())
            .spawn(move || {
                blink_loop(rx, interval, &state);
                running.store(false, Ordering::Release);
            });

        match spawned {
            Ok(handle) => {
                *self.stop_tx.lock() = Some(tx);
                *self.handle.lock() = Some(handle);
                tracing::debug!(target: targets::BLINK, ?interval, "blinker started");
                Ok(())
            }
            Err(err) => {
                self.running.store(false, Ordering::Release);
                Err(BlinkError::ThreadSpawn(err))
            }
        }
    }

    /// Stop the blink thread and wait for it to exit.
    ///
    /// Does nothing if the blinker is not running.
    pub fn stop(&self) {
        if let Some(tx) = self.stop_tx.lock().take() {
            // The thread may already have exited.
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                tracing::warn!(target: targets::BLINK, "blink thread panicked");
            }
            tracing::debug!(target: targets::BLINK, "blinker stopped");
        }
        self.running.store(false, Ordering::Release);
    }

    /// Whether the blink thread is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Make `target` the thing that blinks.
    pub fn set_target<T: BlinkTarget + 'static>(&self, target: &Arc<T>) {
        let target: Arc<dyn BlinkTarget> = target.clone();
        *self.state.target.lock() = Some(Arc::downgrade(&target));
    }

    /// Clear the target, but only if it is still `target`.
    ///
    /// Returns `true` if the target was cleared. A widget losing focus calls
    /// this so it does not clobber a target set by the widget gaining focus.
    pub fn reset_target<T: BlinkTarget + 'static>(&self, target: &Arc<T>) -> bool {
        let mut slot = self.state.target.lock();
        let same = slot
            .as_ref()
            .is_some_and(|current| std::ptr::addr_eq(current.as_ptr(), Arc::as_ptr(target)));
        if same {
            *slot = None;
        }
        same
    }

    /// Clear the target unconditionally.
    pub fn clear_target(&self) {
        *self.state.target.lock() = None;
    }

    /// Whether a live target is set.
    pub fn has_target(&self) -> bool {
        self.state
            .target
            .lock()
            .as_ref()
            .is_some_and(|w| w.strong_count() > 0)
    }

    /// Blink the current target once.
    ///
    /// Returns `false` when there is no live target. The blink thread calls
    /// this every interval; it is public so callers can drive the blinker
    /// from their own timer.
    pub fn tick(&self) -> bool {
        self.state.tick()
    }

    /// Number of successful blinks so far.
    pub fn tick_count(&self) -> u64 {
        self.state.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for CursorBlinker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CursorBlinker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorBlinker")
            .field("running", &self.is_running())
            .field("ticks", &self.tick_count())
            .finish_non_exhaustive()
    }
}

fn blink_loop(stop: Receiver<()>, interval: Duration, state: &BlinkState) {
    loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                state.tick();
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SpriteState {
    visible: bool,
    focused: bool,
}

/// Visibility state of a text cursor.
///
/// A focused sprite toggles on every blink; an unfocused one stays hidden.
#[derive(Debug, Default)]
pub struct CursorSprite {
    state: Mutex<SpriteState>,
}

impl CursorSprite {
    /// Create a hidden, unfocused cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set focus. Gaining focus shows the cursor immediately.
    pub fn set_focused(&self, focused: bool) {
        let mut state = self.state.lock();
        state.focused = focused;
        state.visible = focused;
    }

    /// Whether the cursor has focus.
    pub fn is_focused(&self) -> bool {
        self.state.lock().focused
    }

    /// Whether the cursor is currently drawn.
    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }
}

impl BlinkTarget for CursorSprite {
    fn blink(&self) {
        let mut state = self.state.lock();
        state.visible = state.focused && !state.visible;
    }
}

static_assertions::assert_impl_all!(CursorBlinker: Send, Sync);
static_assertions::assert_impl_all!(CursorSprite: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_toggles_focused_sprite() {
        let blinker = CursorBlinker::new();
        let sprite = Arc::new(CursorSprite::new());
        sprite.set_focused(true);
        blinker.set_target(&sprite);

        assert!(sprite.is_visible());
        assert!(blinker.tick());
        assert!(!sprite.is_visible());
        assert!(blinker.tick());
        assert!(sprite.is_visible());
        assert_eq!(blinker.tick_count(), 2);
    }

    #[test]
    fn test_unfocused_sprite_stays_hidden() {
        let blinker = CursorBlinker::new();
        let sprite = Arc::new(CursorSprite::new());
        blinker.set_target(&sprite);

        blinker.tick();
        blinker.tick();
        assert!(!sprite.is_visible());
    }

    #[test]
    fn test_dropped_target_is_noop() {
        let blinker = CursorBlinker::new();
        {
            let sprite = Arc::new(CursorSprite::new());
            blinker.set_target(&sprite);
            assert!(blinker.has_target());
        }
        assert!(!blinker.has_target());
        assert!(!blinker.tick());
        assert_eq!(blinker.tick_count(), 0);
    }

    #[test]
    fn test_reset_target_only_clears_same() {
        let blinker = CursorBlinker::new();
        let first = Arc::new(CursorSprite::new());
        let second = Arc::new(CursorSprite::new());

        blinker.set_target(&second);
        assert!(!blinker.reset_target(&first));
        assert!(blinker.has_target());
        assert!(blinker.reset_target(&second));
        assert!(!blinker.has_target());
    }

    #[test]
    fn test_start_stop() {
        let blinker = CursorBlinker::new();
        let sprite = Arc::new(CursorSprite::new());
        sprite.set_focused(true);
        blinker.set_target(&sprite);

        blinker.start(Duration::from_millis(5)).unwrap();
        assert!(blinker.is_running());
        assert!(matches!(
            blinker.start(Duration::from_millis(5)),
            Err(BlinkError::AlreadyRunning)
        ));

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while blinker.tick_count() == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        blinker.stop();

        assert!(!blinker.is_running());
        assert!(blinker.tick_count() > 0);

        // Can be restarted after a stop.
        blinker.start(Duration::from_millis(5)).unwrap();
        blinker.stop();
    }

    #[test]
    fn test_zero_interval_rejected() {
        let blinker = CursorBlinker::new();
        assert!(matches!(
            blinker.start(Duration::ZERO),
            Err(BlinkError::ZeroInterval)
        ));
        assert!(!blinker.is_running());
    }
}

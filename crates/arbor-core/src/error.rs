//! Error types for Arbor core services.

use std::fmt;

/// The main error type for Arbor core operations.
#[derive(Debug)]
pub enum CoreError {
    /// Cursor blink service error.
    Blink(BlinkError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blink(err) => write!(f, "Blink service error: {err}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Blink(err) => Some(err),
        }
    }
}

/// Cursor blink service errors.
#[derive(Debug)]
pub enum BlinkError {
    /// The service is already running.
    AlreadyRunning,
    /// The blink interval must be non-zero.
    ZeroInterval,
    /// Failed to spawn the blink thread.
    ThreadSpawn(std::io::Error),
}

impl fmt::Display for BlinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "Blink service is already running"),
            Self::ZeroInterval => write!(f, "Blink interval must be greater than zero"),
            Self::ThreadSpawn(err) => write!(f, "Failed to spawn blink thread: {err}"),
        }
    }
}

impl std::error::Error for BlinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ThreadSpawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BlinkError> for CoreError {
    fn from(err: BlinkError) -> Self {
        Self::Blink(err)
    }
}

/// A specialized Result type for Arbor core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

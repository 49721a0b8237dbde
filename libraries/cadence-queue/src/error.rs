//! Error types for queue management

use cadence_core::CoreError;
use thiserror::Error;
use tracing::error;

/// Queue errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Index outside the valid range
    #[error("Index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Inverted or empty range
    #[error("Invalid range {from} - {to}")]
    InvalidRange { from: usize, to: usize },

    /// Fracture offset that does not lie strictly inside a fracture
    #[error("Cannot create fracture at offset {offset} of fragment with size {size}")]
    InvalidFracture { offset: usize, size: usize },

    /// Attempt to fracture a single-item fragment
    #[error("Cannot fracture a single item fragment")]
    CannotFracture,

    /// Insertion would grow the queue past its limit
    #[error("Queue exceeds maximum size of {max_size} tracks")]
    CapacityExceeded { max_size: usize },

    /// Nothing to add
    #[error("No results found")]
    NoResults,

    /// Cursor is at the end and repeat does not wrap
    #[error("No next element")]
    NoNextElement,

    /// Cursor is at the start and repeat does not wrap
    #[error("No previous element")]
    NoPreviousElement,

    /// Broken internal invariant
    #[error("Invalid queue state: {0}")]
    InvalidState(String),

    /// Error from a playable, container or factory
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueueError {
    /// Create an invalid state error and log it
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        error!("Invalid queue state: {}", msg);
        Self::InvalidState(msg)
    }

    /// Whether this error should be reported to the user rather than treated as a bug
    pub fn is_user_error(&self) -> bool {
        !matches!(self, QueueError::InvalidState(_))
    }
}

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;

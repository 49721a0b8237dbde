/// Core error types for Cadence
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by playables, containers and the factory that resolves them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Metadata was not populated within the caller supplied timeout
    #[error("Metadata not loaded in time")]
    MetadataTimeout,

    /// Loading the playable was cancelled or the item is unavailable upstream
    #[error("Playable unavailable: {0}")]
    Unavailable(String),

    /// The factory failed to resolve a container
    #[error("Failed to resolve {container}: {reason}")]
    Resolution { container: String, reason: String },

    /// A batch of containers resolved to nothing
    #[error("No results found")]
    NoResults,
}

impl CoreError {
    /// Create a resolution error
    pub fn resolution(container: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            container: container.into(),
            reason: reason.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(id: impl Into<String>) -> Self {
        Self::Unavailable(id.into())
    }
}

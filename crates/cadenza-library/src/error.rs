//! Error types for the library service.

use cadenza_core::NavigationError;
use thiserror::Error;

/// Errors surfaced by [`LibraryService`](crate::LibraryService).
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The snapshot was missing or could not be decoded.
    #[error("failed to load library: {0}")]
    Load(#[source] cadenza_core::Error),

    /// Track-list retrieval, ingestion, or index building failed.
    #[error("failed to rebuild library: {0}")]
    Rebuild(#[source] cadenza_core::Error),

    /// The snapshot store could not be opened, written, or closed.
    #[error("snapshot store error: {0}")]
    Persistence(#[source] cadenza_core::Error),

    /// A browse reference or path could not be resolved.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// The current readiness signal was rejected.
    #[error("library not ready: {0}")]
    NotReady(String),
}

impl LibraryError {
    /// Returns `true` when the error is scoped to a single query and left
    /// the library state untouched.
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Navigation(_))
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

/// Convenience alias for library results.
pub type LibraryResult<T> = std::result::Result<T, LibraryError>;

use std::fmt;

use thiserror::Error;

/// Upper bound, in characters, on the object snapshot carried by a
/// [`NavigationError`].
pub const SNAPSHOT_LIMIT: usize = 256;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A path step that could not be resolved against the catalog.
///
/// Carries the failing step, the reason, and a bounded rendering of the
/// object that was being navigated when the step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationError {
    step: String,
    reason: String,
    snapshot: String,
}

impl NavigationError {
    pub fn new(step: impl Into<String>, reason: impl Into<String>, snapshot: &str) -> Self {
        Self {
            step: step.into(),
            reason: reason.into(),
            snapshot: bounded(snapshot),
        }
    }

    /// The path step that failed.
    pub fn step(&self) -> &str {
        &self.step
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Rendering of the navigated object, at most [`SNAPSHOT_LIMIT`]
    /// characters plus an ellipsis.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot navigate path step {:?}: {}; object: {}",
            self.step, self.reason, self.snapshot
        )
    }
}

impl std::error::Error for NavigationError {}

fn bounded(text: &str) -> String {
    match text.char_indices().nth(SNAPSHOT_LIMIT) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

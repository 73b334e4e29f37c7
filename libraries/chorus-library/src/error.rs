//! Error types for the library layer.

use thiserror::Error;

/// Errors that can occur in library operations.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Remote store operation failed
    #[error(transparent)]
    Store(#[from] chorus_store::StoreError),

    /// Operation requires a signed-in user
    #[error("Not signed in")]
    NotSignedIn,

    /// The requested entity is not in the library
    #[error("Not found in library: {0}")]
    NotFound(String),

    /// The collection is a future-dated release and cannot be opened yet
    #[error("{name} has not been released yet")]
    UpcomingRelease {
        /// Collection name
        name: String,
    },

    /// Checkpoint file could not be read or written
    #[error("Checkpoint IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Checkpoint content could not be serialized
    #[error("Checkpoint serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;

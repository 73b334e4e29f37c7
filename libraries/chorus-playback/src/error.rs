//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Requested track is not in the queue source
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Audio sink rejected an operation
    #[error("Audio sink error: {0}")]
    Sink(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

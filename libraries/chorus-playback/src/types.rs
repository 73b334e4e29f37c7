//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Track information for queue management
///
/// Carries everything the session needs for playback and display; the full
/// domain entity stays in the library cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueTrack {
    /// Unique track identifier from the record store
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist display line
    pub artist: String,

    /// Audio source URL for the sink
    pub audio_url: String,
}

/// Observable playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No current track
    Empty,

    /// Track loaded, paused
    Paused,

    /// Track loaded, playing
    Playing,
}

/// Playback progress reported by the audio sink.
///
/// Purely observational side-channel state; it never drives transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    /// Current position in the track
    pub position: Duration,

    /// Track duration, known once the sink has loaded metadata
    pub duration: Option<Duration>,
}

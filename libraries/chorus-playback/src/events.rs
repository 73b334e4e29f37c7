//! Session events
//!
//! Emitted at state and track changes and drained by the embedding shell,
//! which renders them and wires `TrackStarted` to the library's play-count
//! side effect.

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// An explicit track selection. Fired once per fresh selection, never
    /// for skips, shuffle starts, or progress ticks; the shell forwards it
    /// to the play-count increment.
    TrackStarted {
        /// Id of the started track
        track_id: String,
    },

    /// The current track changed
    TrackChanged {
        /// Id of the new current track
        track_id: String,
        /// Id of the previous current track, if any
        previous_track_id: Option<String>,
    },

    /// Play/pause/empty state changed
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// Transient, user-visible playback notice (e.g. unplayable source)
    PlaybackNotice {
        /// Message to surface
        message: String,
    },
}

//! Audio sink abstraction
//!
//! The session owns exactly one sink and is the only component allowed to
//! touch its source or transport state. Platform glue implements the trait
//! over whatever playable-media handle the host provides and feeds the
//! sink's events back into the session via
//! [`crate::PlaybackSession::handle_sink_event`].

use crate::error::Result;
use std::time::Duration;

/// A single playable-media output handle.
pub trait AudioSink {
    /// Attach a new source URL. Must be called before `play` on that source;
    /// the sink is not ready until it has loaded the new source.
    fn set_source(&mut self, url: &str);

    /// Begin or resume playback. May reject (unplayable source); the session
    /// treats a rejection as a transient, non-fatal playback error.
    fn play(&mut self) -> Result<()>;

    /// Pause playback.
    fn pause(&mut self);

    /// Move the playback position.
    fn set_position(&mut self, position: Duration);
}

/// Events reported by the audio sink.
///
/// Delivered to the session tagged with the source epoch they belong to, so
/// late events from an abandoned source are never applied to the current
/// track's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// Source metadata loaded; duration is now known
    MetadataReady {
        /// Track duration
        duration: Duration,
    },

    /// Periodic progress update
    Position {
        /// Current position
        position: Duration,
        /// Track duration
        duration: Duration,
    },

    /// Source played to the end
    Ended,

    /// Playback failed (unplayable source, network error)
    Error {
        /// Sink-reported message
        message: String,
    },
}

//! Chorus Player - Playback Session
//!
//! Platform-agnostic playback session for Chorus Player: an ordered track
//! queue, a three-state play machine (Empty, Paused, Playing), and wrapping
//! next/previous navigation with loop-on-end semantics.
//!
//! The audio output is provided by the platform via the [`AudioSink`] trait;
//! the session owns the sink exclusively and is the only component that may
//! touch its source or transport state. Sink events flow back in through
//! [`PlaybackSession::handle_sink_event`], tagged with the source epoch so
//! late events for an abandoned source are discarded.
//!
//! # Example
//!
//! ```rust,no_run
//! use chorus_playback::{AudioSink, PlaybackSession, QueueTrack, Result};
//! use std::time::Duration;
//!
//! struct MySink;
//!
//! impl AudioSink for MySink {
//!     fn set_source(&mut self, _url: &str) {}
//!     fn play(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) {}
//!     fn set_position(&mut self, _position: Duration) {}
//! }
//!
//! let mut session = PlaybackSession::new(MySink);
//! session.set_library(vec![QueueTrack {
//!     id: "t1".into(),
//!     title: "My Song".into(),
//!     artist: "Artist".into(),
//!     audio_url: "https://cdn.example/t1.mp3".into(),
//! }]);
//!
//! session.shuffle_play_all().unwrap();
//! session.next().unwrap();
//! for event in session.drain_events() {
//!     // forward TrackStarted to the play counter, render the rest
//! }
//! ```

mod error;
mod events;
mod queue;
mod session;
mod shuffle;
mod sink;
pub mod types;

pub use error::{PlaybackError, Result};
pub use events::SessionEvent;
pub use queue::Queue;
pub use session::{PlaybackSession, PREVIOUS_RESTART_THRESHOLD};
pub use shuffle::shuffle_tracks;
pub use sink::{AudioSink, SinkEvent};
pub use types::{PlaybackState, Progress, QueueTrack};

//! Playback session state machine
//!
//! Three observable states: Empty (no current track), Paused, Playing. The
//! session owns the audio sink exclusively; every transition orders the
//! source swap before any play call on the new source, and an initial seek
//! is parked until the sink reports metadata for that source.

use crate::error::{PlaybackError, Result};
use crate::events::SessionEvent;
use crate::queue::Queue;
use crate::shuffle::shuffle_tracks;
use crate::sink::{AudioSink, SinkEvent};
use crate::types::{PlaybackState, Progress, QueueTrack};
use std::time::Duration;
use tracing::{debug, warn};

/// Pressing previous within this window moves to the prior track; after it,
/// the current track restarts instead.
pub const PREVIOUS_RESTART_THRESHOLD: Duration = Duration::from_secs(3);

/// State machine over an ordered track queue and a single audio sink.
pub struct PlaybackSession<S: AudioSink> {
    sink: S,
    queue: Queue,
    library: Vec<QueueTrack>,
    playing: bool,
    progress: Progress,
    pending_seek: Option<Duration>,
    source_epoch: u64,
    last_announced_track: Option<String>,
    pending_events: Vec<SessionEvent>,
}

impl<S: AudioSink> PlaybackSession<S> {
    /// Create a session owning the given sink, with no queue.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            queue: Queue::new(),
            library: Vec::new(),
            playing: false,
            progress: Progress::default(),
            pending_seek: None,
            source_epoch: 0,
            last_announced_track: None,
            pending_events: Vec::new(),
        }
    }

    /// Set the full-library track list used when no explicit queue source is
    /// given to [`select_track`](Self::select_track) or by
    /// [`shuffle_play_all`](Self::shuffle_play_all).
    pub fn set_library(&mut self, tracks: Vec<QueueTrack>) {
        self.library = tracks;
    }

    /// The observable state.
    pub fn state(&self) -> PlaybackState {
        if self.queue.current().is_none() {
            PlaybackState::Empty
        } else if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    /// The current track, equal to the queue entry at the current index.
    pub fn current_track(&self) -> Option<&QueueTrack> {
        self.queue.current()
    }

    /// The queue.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Observed progress.
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Whether the play flag is set.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Epoch of the currently attached source. Sink events must be tagged
    /// with the epoch captured when their source was attached; events from
    /// an older source are dropped.
    pub fn source_epoch(&self) -> u64 {
        self.source_epoch
    }

    /// Select a track for playback, building a new queue from
    /// `queue_source` (or the full library when `None`).
    ///
    /// Re-selecting the track that is already current toggles play/pause
    /// instead of restarting it. A fresh selection emits
    /// [`SessionEvent::TrackStarted`], the one hook that drives the
    /// play-count increment.
    pub fn select_track(&mut self, track_id: &str, queue_source: Option<&[QueueTrack]>) -> Result<()> {
        if self.queue.current().is_some_and(|t| t.id == track_id) {
            self.toggle_play_pause();
            return Ok(());
        }

        let source = queue_source.unwrap_or(&self.library);
        let index = source
            .iter()
            .position(|t| t.id == track_id)
            .ok_or_else(|| PlaybackError::TrackNotFound(track_id.to_string()))?;

        self.queue.set_tracks(source.to_vec());
        self.queue.select(index)?;
        self.start_current();
        self.pending_events.push(SessionEvent::TrackStarted {
            track_id: track_id.to_string(),
        });
        Ok(())
    }

    /// Build a randomized permutation of the full library, start at the
    /// first slot, and play.
    pub fn shuffle_play_all(&mut self) -> Result<()> {
        if self.library.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        let mut tracks = self.library.clone();
        shuffle_tracks(&mut tracks);
        self.queue.set_tracks(tracks);
        self.queue.select(0)?;
        self.start_current();
        Ok(())
    }

    /// Advance to the next track, wrapping, and play.
    pub fn next(&mut self) -> Result<()> {
        self.queue.advance()?;
        self.start_current();
        Ok(())
    }

    /// Go to the prior track, wrapping, and play. If more than
    /// [`PREVIOUS_RESTART_THRESHOLD`] of the current track has elapsed, the
    /// current track restarts instead.
    pub fn previous(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }

        if self.queue.current().is_some() && self.progress.position > PREVIOUS_RESTART_THRESHOLD {
            self.sink.set_position(Duration::ZERO);
            self.progress.position = Duration::ZERO;
            self.resume();
            return Ok(());
        }

        self.queue.retreat()?;
        self.start_current();
        Ok(())
    }

    /// Move the playback position. Play/pause state is unchanged.
    pub fn seek(&mut self, position: Duration) {
        self.sink.set_position(position);
        self.progress.position = position;
        // A seek before the sink loads the source must survive the load
        if self.pending_seek.is_some() {
            self.pending_seek = Some(position);
        }
    }

    /// Flip play/pause. With a queue but no current track, the first queued
    /// track becomes current first. With no queue at all this is a no-op.
    pub fn toggle_play_pause(&mut self) {
        if self.queue.current().is_none() {
            if !self.queue.is_empty() {
                // select() on a non-empty queue at index 0 cannot fail
                let _ = self.queue.select(0);
                self.start_current();
            }
            return;
        }

        if self.playing {
            self.sink.pause();
            self.playing = false;
            self.emit_state();
        } else {
            self.resume();
        }
    }

    /// Pause and drop the queue. Used on sign-out.
    pub fn stop(&mut self) {
        self.sink.pause();
        self.playing = false;
        self.queue.clear();
        self.progress = Progress::default();
        self.pending_seek = None;
        self.last_announced_track = None;
        // In-flight events for the abandoned source must not resurrect it
        self.source_epoch += 1;
        self.emit_state();
    }

    /// Feed one sink event into the session. `epoch` must be the value of
    /// [`source_epoch`](Self::source_epoch) captured when the event's source
    /// was attached; events from an abandoned source are discarded.
    pub fn handle_sink_event(&mut self, epoch: u64, event: SinkEvent) {
        if epoch != self.source_epoch {
            debug!(epoch, current = self.source_epoch, "Dropping stale sink event");
            return;
        }

        match event {
            SinkEvent::MetadataReady { duration } => {
                self.progress.duration = Some(duration);
                if let Some(position) = self.pending_seek.take() {
                    self.sink.set_position(position);
                    self.progress.position = position;
                }
            }
            SinkEvent::Position { position, duration } => {
                self.progress = Progress {
                    position,
                    duration: Some(duration),
                };
            }
            SinkEvent::Ended => {
                // Loop semantics: the queue wraps indefinitely
                if self.next().is_err() {
                    self.playing = false;
                    self.emit_state();
                }
            }
            SinkEvent::Error { message } => {
                warn!(%message, "Sink reported a playback error");
                self.playing = false;
                self.emit_state();
                self.pending_events
                    .push(SessionEvent::PlaybackNotice { message });
            }
        }
    }

    /// Drain all pending events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Attach the current queue entry to the sink and play it from the top.
    ///
    /// The source swap always precedes the play call; the initial seek to
    /// zero is parked until the sink reports metadata for the new source.
    fn start_current(&mut self) {
        let Some(track) = self.queue.current() else {
            return;
        };
        let track_id = track.id.clone();
        let audio_url = track.audio_url.clone();
        let previous_track_id = self.last_announced_track.take();

        self.source_epoch += 1;
        self.sink.set_source(&audio_url);
        self.progress = Progress::default();
        self.pending_seek = Some(Duration::ZERO);

        self.pending_events.push(SessionEvent::TrackChanged {
            track_id: track_id.clone(),
            previous_track_id,
        });
        self.last_announced_track = Some(track_id);
        self.resume();
    }

    /// Issue a play call on the attached source, downgrading a rejection to
    /// a paused state plus a transient notice.
    fn resume(&mut self) {
        match self.sink.play() {
            Ok(()) => {
                self.playing = true;
                self.emit_state();
            }
            Err(e) => {
                self.playing = false;
                self.emit_state();
                self.pending_events.push(SessionEvent::PlaybackNotice {
                    message: e.to_string(),
                });
            }
        }
    }

    fn emit_state(&mut self) {
        self.pending_events.push(SessionEvent::StateChanged {
            state: self.state(),
        });
    }
}

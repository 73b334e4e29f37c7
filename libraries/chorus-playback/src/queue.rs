//! Ordered playback queue
//!
//! A flat ordered track list plus a nullable current index. Invariant: the
//! current track is `tracks[index]` whenever the index is set and the queue
//! is non-empty; otherwise there is no current track.

use crate::error::{PlaybackError, Result};
use crate::types::QueueTrack;

/// Ordered queue with wrapping navigation
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<QueueTrack>,
    index: Option<usize>,
}

impl Queue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue contents, clearing the current index
    pub fn set_tracks(&mut self, tracks: Vec<QueueTrack>) {
        self.tracks = tracks;
        self.index = None;
    }

    /// Clear the queue
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.index = None;
    }

    /// Position of a track id, if queued
    pub fn locate(&self, track_id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track_id)
    }

    /// Make the track at `index` current
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.index = Some(index);
        Ok(())
    }

    /// The current track
    pub fn current(&self) -> Option<&QueueTrack> {
        self.index.and_then(|i| self.tracks.get(i))
    }

    /// The current index
    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    /// Advance to the next track, wrapping at the end. With no current
    /// track, selects the first.
    pub fn advance(&mut self) -> Result<&QueueTrack> {
        if self.tracks.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        let next = match self.index {
            Some(i) => (i + 1) % self.tracks.len(),
            None => 0,
        };
        self.index = Some(next);
        Ok(&self.tracks[next])
    }

    /// Step back to the prior track, wrapping at the front. With no current
    /// track, selects the first.
    pub fn retreat(&mut self) -> Result<&QueueTrack> {
        if self.tracks.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        let prev = match self.index {
            Some(i) => (i + self.tracks.len() - 1) % self.tracks.len(),
            None => 0,
        };
        self.index = Some(prev);
        Ok(&self.tracks[prev])
    }

    /// All queued tracks in order
    pub fn tracks(&self) -> &[QueueTrack] {
        &self.tracks
    }

    /// Number of queued tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

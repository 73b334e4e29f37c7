//! Collection (album / playlist) domain type

use crate::types::{ImageAsset, Track};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionKind {
    /// Album owned by an artist
    Album,

    /// Curated or user playlist
    Playlist,
}

/// An ordered collection of tracks.
///
/// `track_ids` is the source of truth. `tracks` is a derived projection and
/// must be recomputed whenever the backing track cache changes; see
/// [`Collection::resolve_tracks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Unique record id
    pub id: String,

    /// Collection name
    pub name: String,

    /// Description text
    pub description: String,

    /// Cover image
    pub cover: ImageAsset,

    /// Video cover URL, shown instead of the image when present
    pub cover_video_url: Option<String>,

    /// Ordered track ids (source of truth)
    pub track_ids: Vec<String>,

    /// Resolved tracks (derived, possibly stale)
    pub tracks: Vec<Track>,

    /// Whether this is the user's implicit favorites collection
    pub is_favorites: bool,

    /// Album or playlist
    pub kind: CollectionKind,

    /// Owning artist id, for albums
    pub artist_id: Option<String>,

    /// Release date; future-dated collections are locked from playback
    pub release_date: Option<NaiveDate>,
}

impl Collection {
    /// Whether the collection is still an upcoming release as of `today`.
    ///
    /// A release dated today counts as upcoming; it unlocks the first day the
    /// date is in the past.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.release_date.is_some_and(|date| date >= today)
    }

    /// Recompute the `tracks` projection from `track_ids`.
    ///
    /// Ids missing from the cache are dropped from the projection; the id
    /// list itself is left untouched.
    pub fn resolve_tracks(&mut self, track_cache: &HashMap<String, Track>) {
        self.tracks = self
            .track_ids
            .iter()
            .filter_map(|id| track_cache.get(id).cloned())
            .collect();
    }
}

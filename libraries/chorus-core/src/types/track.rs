//! Track domain type

use crate::types::{ArtistRef, ImageAsset};
use serde::{Deserialize, Serialize};

/// A playable track from the catalog.
///
/// Created out-of-band by the upload tool; read-only from the player except
/// for the `likes` and `listens` counters, which optimistic mutations adjust
/// locally and remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique record id
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist references, resolved against the artist table at decode time
    pub artists: Vec<ArtistRef>,

    /// Lyrics text (empty when none uploaded)
    pub lyrics: String,

    /// Audio source URL
    pub audio_url: String,

    /// Cover image
    pub cover: ImageAsset,

    /// Like counter
    pub likes: u64,

    /// Play counter
    pub listens: u64,

    /// External clip link (optional)
    pub clip_url: Option<String>,

    /// Content-advisory flag
    pub explicit: bool,
}

impl Track {
    /// Display string joining all artist names
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

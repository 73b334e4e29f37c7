//! User domain type

use crate::types::ImageAsset;
use serde::{Deserialize, Serialize};

/// A signed-in user account.
///
/// The three id sets drive the library views. Invariant: `liked_track_ids`
/// mirrors the track-id list of the user's favorites collection; both are
/// only ever edited together by the toggle-like mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique record id
    pub id: String,

    /// Account email
    pub email: String,

    /// Display name
    pub name: String,

    /// Avatar image
    pub avatar: Option<ImageAsset>,

    /// Liked track ids
    pub liked_track_ids: Vec<String>,

    /// Liked artist ids
    pub liked_artist_ids: Vec<String>,

    /// Favorite collection ids (favorites playlist plus liked albums)
    pub favorite_collection_ids: Vec<String>,

    /// Cumulative listening time in minutes (fractional)
    pub listening_minutes: f64,
}

impl User {
    /// Whether the user has liked the given track
    pub fn likes_track(&self, track_id: &str) -> bool {
        self.liked_track_ids.iter().any(|id| id == track_id)
    }

    /// Whether the user has liked the given artist
    pub fn likes_artist(&self, artist_id: &str) -> bool {
        self.liked_artist_ids.iter().any(|id| id == artist_id)
    }

    /// Whether the given collection is among the user's favorites
    pub fn has_favorite_collection(&self, collection_id: &str) -> bool {
        self.favorite_collection_ids.iter().any(|id| id == collection_id)
    }
}

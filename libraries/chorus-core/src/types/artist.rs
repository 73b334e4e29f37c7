//! Artist domain types

use crate::types::{Collection, ImageAsset, Track};
use serde::{Deserialize, Serialize};

/// Reference from a track to one of its artists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    /// Artist record id
    pub id: String,

    /// Display name
    pub name: String,
}

/// Lightweight artist projection for list views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleArtist {
    /// Unique record id
    pub id: String,

    /// Artist name
    pub name: String,

    /// Artist photo
    pub photo: Option<ImageAsset>,
}

/// Fully resolved artist for the detail view.
///
/// `tracks` and `albums` are resolved by the caller; decoders only produce
/// the linked id lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    /// Unique record id
    pub id: String,

    /// Artist name
    pub name: String,

    /// Biography / description text
    pub description: String,

    /// Status marker (legal / advisory)
    pub status: Option<String>,

    /// Artist photo
    pub photo: Option<ImageAsset>,

    /// Resolved tracks
    pub tracks: Vec<Track>,

    /// Resolved albums (collections of kind Album)
    pub albums: Vec<Collection>,
}

impl Artist {
    /// Projection used by list views
    pub fn as_simple(&self) -> SimpleArtist {
        SimpleArtist {
            id: self.id.clone(),
            name: self.name.clone(),
            photo: self.photo.clone(),
        }
    }
}

//! Record decoders
//!
//! One decoder per entity kind. Each decoder is total over well-formed JSON:
//! a row missing a mandatory field produces [`Decoded::Skip`] with a reason
//! so the caller can drop it from the result set, and nothing here ever
//! errors or fetches. Artist-name resolution for tracks takes an already
//! loaded id → name index as an argument.

use crate::record::Record;
use crate::types::{ArtistRef, Collection, CollectionKind, ImageAsset, SimpleArtist, Track, User};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

/// Default wire field names.
///
/// The exact backend schema is configurable at the store layer; decoders only
/// see the canonical names below, which the store maps table fields onto.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const NAME: &str = "name";
    pub const ARTISTS: &str = "artists";
    pub const LYRICS: &str = "lyrics";
    pub const AUDIO: &str = "audio";
    pub const COVER: &str = "cover";
    pub const COVER_VIDEO: &str = "cover_video";
    pub const LIKES: &str = "likes";
    pub const LISTENS: &str = "listens";
    pub const CLIP_URL: &str = "clip_url";
    pub const EXPLICIT: &str = "explicit";
    pub const PHOTO: &str = "photo";
    pub const DESCRIPTION: &str = "description";
    pub const STATUS: &str = "status";
    pub const TRACKS: &str = "tracks";
    pub const COLLECTIONS: &str = "collections";
    pub const FAVORITES: &str = "favorites";
    pub const KIND: &str = "kind";
    pub const ARTIST: &str = "artist";
    pub const RELEASE_DATE: &str = "release_date";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const AVATAR: &str = "avatar";
    pub const LIKED_TRACKS: &str = "liked_tracks";
    pub const LIKED_ARTISTS: &str = "liked_artists";
    pub const FAVORITE_COLLECTIONS: &str = "favorite_collections";
    pub const LISTENING_MINUTES: &str = "listening_minutes";
    pub const ATTACHMENT: &str = "attachment";
}

/// Cover shown when a row carries no usable cover attachment
pub const FALLBACK_COVER_URL: &str = "https://static.chorus.example/cover-fallback.png";

/// Outcome of decoding one record
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// Row decoded successfully
    Entity(T),

    /// Row is malformed and must be dropped from the result set
    Skip {
        /// Human-readable reason, for debug logging
        reason: String,
    },
}

impl<T> Decoded<T> {
    /// The decoded entity, discarding the skip reason
    pub fn entity(self) -> Option<T> {
        match self {
            Decoded::Entity(entity) => Some(entity),
            Decoded::Skip { .. } => None,
        }
    }

    /// The skip reason, if the row was dropped
    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            Decoded::Entity(_) => None,
            Decoded::Skip { reason } => Some(reason),
        }
    }
}

fn skip<T>(reason: impl Into<String>) -> Decoded<T> {
    Decoded::Skip {
        reason: reason.into(),
    }
}

/// Decode an attachment field (array of `{url, thumbnails}` objects) into an
/// image asset. Returns `None` when the field is absent or carries no URL.
pub fn decode_image_asset(value: Option<&Value>) -> Option<ImageAsset> {
    let first = value?.as_array()?.first()?;
    let full = first.get("url")?.as_str()?.to_string();
    let thumb = |size: &str| {
        first
            .get("thumbnails")?
            .get(size)?
            .get("url")?
            .as_str()
            .map(String::from)
    };
    Some(ImageAsset {
        full,
        large: thumb("large"),
        small: thumb("small"),
    })
}

/// URL of the first attachment in a field, if any
fn attachment_url(value: Option<&Value>) -> Option<String> {
    value?
        .as_array()?
        .first()?
        .get("url")?
        .as_str()
        .map(String::from)
}

/// Linked record ids in a field (array of id strings)
pub fn linked_ids(record: &Record, field: &str) -> Vec<String> {
    record
        .field(field)
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn cover_or_fallback(value: Option<&Value>) -> ImageAsset {
    decode_image_asset(value).unwrap_or_else(|| ImageAsset::full_only(FALLBACK_COVER_URL))
}

/// Decode a track row.
///
/// Mandatory: title, a playable audio attachment, and at least one artist
/// reference. `artist_names` must already contain the artist table; ids with
/// no entry keep the raw id as their display name.
pub fn decode_track(record: &Record, artist_names: &HashMap<String, String>) -> Decoded<Track> {
    let Some(title) = record.str_field(fields::TITLE) else {
        return skip(format!("track {}: missing title", record.id));
    };
    let Some(audio_url) = attachment_url(record.field(fields::AUDIO)) else {
        return skip(format!("track {}: missing audio attachment", record.id));
    };
    let artist_ids = linked_ids(record, fields::ARTISTS);
    if artist_ids.is_empty() {
        return skip(format!("track {}: no artist reference", record.id));
    }

    let artists = artist_ids
        .into_iter()
        .map(|id| {
            let name = artist_names.get(&id).cloned().unwrap_or_else(|| id.clone());
            ArtistRef { id, name }
        })
        .collect();

    Decoded::Entity(Track {
        id: record.id.clone(),
        title: title.to_string(),
        artists,
        lyrics: record.str_field(fields::LYRICS).unwrap_or_default().to_string(),
        audio_url,
        cover: cover_or_fallback(record.field(fields::COVER)),
        likes: record.num_field(fields::LIKES).unwrap_or(0.0).max(0.0) as u64,
        listens: record.num_field(fields::LISTENS).unwrap_or(0.0).max(0.0) as u64,
        clip_url: record.str_field(fields::CLIP_URL).map(String::from),
        explicit: record.bool_field(fields::EXPLICIT),
    })
}

/// Decode an artist row into its list-view projection. Mandatory: name.
pub fn decode_simple_artist(record: &Record) -> Decoded<SimpleArtist> {
    let Some(name) = record.str_field(fields::NAME) else {
        return skip(format!("artist {}: missing name", record.id));
    };
    Decoded::Entity(SimpleArtist {
        id: record.id.clone(),
        name: name.to_string(),
        photo: decode_image_asset(record.field(fields::PHOTO)),
    })
}

/// Decode a collection row. Mandatory: name. The `tracks` projection starts
/// empty and is resolved against the track cache by the caller.
pub fn decode_collection(record: &Record) -> Decoded<Collection> {
    let Some(name) = record.str_field(fields::NAME) else {
        return skip(format!("collection {}: missing name", record.id));
    };

    let kind = match record.str_field(fields::KIND) {
        Some(kind) if kind.eq_ignore_ascii_case("album") => CollectionKind::Album,
        _ => CollectionKind::Playlist,
    };

    let release_date = record
        .str_field(fields::RELEASE_DATE)
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok());

    Decoded::Entity(Collection {
        id: record.id.clone(),
        name: name.to_string(),
        description: record
            .str_field(fields::DESCRIPTION)
            .unwrap_or_default()
            .to_string(),
        cover: cover_or_fallback(record.field(fields::COVER)),
        cover_video_url: attachment_url(record.field(fields::COVER_VIDEO)),
        track_ids: linked_ids(record, fields::TRACKS),
        tracks: Vec::new(),
        is_favorites: record.bool_field(fields::FAVORITES),
        kind,
        artist_id: linked_ids(record, fields::ARTIST).into_iter().next(),
        release_date,
    })
}

/// Decode a user row. Mandatory: email.
pub fn decode_user(record: &Record) -> Decoded<User> {
    let Some(email) = record.str_field(fields::EMAIL) else {
        return skip(format!("user {}: missing email", record.id));
    };
    Decoded::Entity(User {
        id: record.id.clone(),
        email: email.to_string(),
        name: record.str_field(fields::NAME).unwrap_or_default().to_string(),
        avatar: decode_image_asset(record.field(fields::AVATAR)),
        liked_track_ids: linked_ids(record, fields::LIKED_TRACKS),
        liked_artist_ids: linked_ids(record, fields::LIKED_ARTISTS),
        favorite_collection_ids: linked_ids(record, fields::FAVORITE_COLLECTIONS),
        listening_minutes: record.num_field(fields::LISTENING_MINUTES).unwrap_or(0.0),
    })
}

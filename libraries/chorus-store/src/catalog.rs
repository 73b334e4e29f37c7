//! Typed catalog operations on top of the raw record client.
//!
//! [`CatalogClient`] knows the five logical tables and decodes rows into
//! domain types, dropping malformed rows. The [`RemoteCatalog`] trait is the
//! seam the library layer consumes, so optimistic-mutation behavior can be
//! tested against a fake store.

use crate::client::{ListOptions, RecordStoreClient, SortSpec};
use crate::error::{Result, StoreError};
use crate::filter::{Filter, ID_BATCH_SIZE};
use async_trait::async_trait;
use chorus_core::decode::fields;
use chorus_core::{
    decode_collection, decode_simple_artist, decode_track, linked_ids, Artist,
    Collection, CollectionKind, Decoded, ImageAsset, Record, SimpleArtist, Track, User,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Which track counter a write targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    /// Like counter
    Likes,

    /// Play counter
    Listens,
}

impl CounterField {
    fn field_name(self) -> &'static str {
        match self {
            CounterField::Likes => fields::LIKES,
            CounterField::Listens => fields::LISTENS,
        }
    }
}

/// Partial update of the user's three id-set fields.
///
/// `None` leaves a field untouched; `Some` replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSetUpdate {
    /// Liked track ids
    pub liked_tracks: Option<Vec<String>>,

    /// Liked artist ids
    pub liked_artists: Option<Vec<String>>,

    /// Favorite collection ids
    pub favorite_collections: Option<Vec<String>>,
}

impl IdSetUpdate {
    fn is_empty(&self) -> bool {
        self.liked_tracks.is_none()
            && self.liked_artists.is_none()
            && self.favorite_collections.is_none()
    }
}

/// Remote operations the library layer depends on.
///
/// Implemented by [`CatalogClient`] for the real store and by fakes in tests.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Every track in the catalog, title-sorted
    async fn all_tracks(&self, artist_names: &HashMap<String, String>) -> Result<Vec<Track>>;

    /// Tracks matching the given ids, fetched in batched id filters
    async fn tracks_by_ids(
        &self,
        ids: &[String],
        artist_names: &HashMap<String, String>,
    ) -> Result<Vec<Track>>;

    /// Every artist, name-sorted
    async fn all_artists(&self) -> Result<Vec<SimpleArtist>>;

    /// Artists matching the given ids
    async fn artists_by_ids(&self, ids: &[String]) -> Result<Vec<SimpleArtist>>;

    /// Full artist detail with resolved tracks and albums
    async fn artist_details(
        &self,
        artist_id: &str,
        artist_names: &HashMap<String, String>,
    ) -> Result<Artist>;

    /// Every collection in the catalog
    async fn all_collections(&self) -> Result<Vec<Collection>>;

    /// Collections matching the given ids
    async fn collections_by_ids(&self, ids: &[String]) -> Result<Vec<Collection>>;

    /// Sign in with email and password
    async fn login(&self, email: &str, password: &str) -> Result<User>;

    /// Create an account; fails when the email is already registered
    async fn register(&self, email: &str, password: &str, name: &str) -> Result<User>;

    /// Replace the user's id-set fields
    async fn update_user_id_sets(&self, user_id: &str, update: &IdSetUpdate) -> Result<()>;

    /// Set a track counter to an absolute value
    async fn set_track_counter(&self, track_id: &str, field: CounterField, value: u64)
        -> Result<()>;

    /// Replace a collection's ordered track-id list
    async fn set_collection_track_ids(&self, collection_id: &str, track_ids: &[String])
        -> Result<()>;

    /// Set the user's cumulative listening time
    async fn set_listening_minutes(&self, user_id: &str, minutes: f64) -> Result<()>;
}

/// A user's shelf collections, split by kind.
#[derive(Debug, Clone, Default)]
pub struct UserCollections {
    /// Playlists, the implicit favorites playlist included
    pub playlists: Vec<Collection>,

    /// Liked albums
    pub albums: Vec<Collection>,
}

/// Typed client over the five catalog tables.
pub struct CatalogClient {
    store: RecordStoreClient,
}

impl CatalogClient {
    /// Wrap a raw record client
    pub fn new(store: RecordStoreClient) -> Self {
        Self { store }
    }

    /// The underlying record client
    pub fn store(&self) -> &RecordStoreClient {
        &self.store
    }

    pub(crate) fn tables(&self) -> &crate::config::TableNames {
        &self.store.config().tables
    }

    /// Look up an image from the auxiliary media-asset table by name.
    pub async fn media_asset(&self, name: &str) -> Result<Option<ImageAsset>> {
        let records = self
            .store
            .list(
                &self.tables().media,
                &ListOptions::filtered(Filter::field_eq(fields::NAME, name)),
            )
            .await?;
        Ok(records
            .first()
            .and_then(|r| chorus_core::decode::decode_image_asset(r.field(fields::ATTACHMENT))))
    }

    /// The collections on a user's shelf, split into playlists and albums.
    pub async fn collections_for_user(&self, user: &User) -> Result<UserCollections> {
        let collections = self
            .collections_by_ids(&user.favorite_collection_ids)
            .await?;
        let (playlists, albums): (Vec<_>, Vec<_>) = collections
            .into_iter()
            .partition(|c| c.kind == CollectionKind::Playlist);
        Ok(UserCollections { playlists, albums })
    }

    async fn list_collections(&self, options: &ListOptions) -> Result<Vec<Collection>> {
        let records = self.store.list(&self.tables().collections, options).await?;
        Ok(decode_dropping_skips(&records, decode_collection))
    }
}

/// Decode a record set, dropping skipped rows with a debug log.
fn decode_dropping_skips<T>(
    records: &[Record],
    decode: impl Fn(&Record) -> Decoded<T>,
) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| {
            let decoded = decode(record);
            if let Some(reason) = decoded.skip_reason() {
                debug!(%reason, "Dropping malformed record");
            }
            decoded.entity()
        })
        .collect()
}

#[async_trait]
impl RemoteCatalog for CatalogClient {
    async fn all_tracks(&self, artist_names: &HashMap<String, String>) -> Result<Vec<Track>> {
        let records = self
            .store
            .list(
                &self.tables().tracks,
                &ListOptions::sorted(SortSpec::ascending(fields::TITLE)),
            )
            .await?;
        Ok(decode_dropping_skips(&records, |r| {
            decode_track(r, artist_names)
        }))
    }

    async fn tracks_by_ids(
        &self,
        ids: &[String],
        artist_names: &HashMap<String, String>,
    ) -> Result<Vec<Track>> {
        let mut tracks = Vec::with_capacity(ids.len());
        for batch in ids.chunks(ID_BATCH_SIZE) {
            let options = ListOptions::filtered(Filter::any_record_ids(batch.iter().cloned()));
            // A failed batch is logged and skipped; the remaining batches
            // still load so one bad request does not empty a playlist.
            match self.store.list(&self.tables().tracks, &options).await {
                Ok(records) => {
                    tracks.extend(decode_dropping_skips(&records, |r| {
                        decode_track(r, artist_names)
                    }));
                }
                Err(e) => warn!(error = %e, "Failed to fetch a batch of tracks"),
            }
        }
        Ok(tracks)
    }

    async fn all_artists(&self) -> Result<Vec<SimpleArtist>> {
        let records = self
            .store
            .list(
                &self.tables().artists,
                &ListOptions::sorted(SortSpec::ascending(fields::NAME)),
            )
            .await?;
        Ok(decode_dropping_skips(&records, decode_simple_artist))
    }

    async fn artists_by_ids(&self, ids: &[String]) -> Result<Vec<SimpleArtist>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut artists = Vec::with_capacity(ids.len());
        for batch in ids.chunks(ID_BATCH_SIZE) {
            let options = ListOptions::filtered(Filter::any_record_ids(batch.iter().cloned()));
            let records = self.store.list(&self.tables().artists, &options).await?;
            artists.extend(decode_dropping_skips(&records, decode_simple_artist));
        }
        Ok(artists)
    }

    async fn artist_details(
        &self,
        artist_id: &str,
        artist_names: &HashMap<String, String>,
    ) -> Result<Artist> {
        let record = self.store.get(&self.tables().artists, artist_id).await?;
        let name = record
            .str_field(fields::NAME)
            .ok_or_else(|| StoreError::Parse(format!("artist {artist_id}: missing name")))?
            .to_string();

        // Linked ids straight off the artist row avoid scanning the catalog.
        let track_ids = linked_ids(&record, fields::TRACKS);
        let collection_ids = linked_ids(&record, fields::COLLECTIONS);

        let tracks = self.tracks_by_ids(&track_ids, artist_names).await?;
        let albums = self
            .collections_by_ids(&collection_ids)
            .await?
            .into_iter()
            .filter(|c| c.kind == CollectionKind::Album)
            .collect();

        let description = record
            .str_field(fields::DESCRIPTION)
            .unwrap_or_default()
            .to_string();
        let status = record.str_field(fields::STATUS).map(String::from);
        let photo = chorus_core::decode::decode_image_asset(record.field(fields::PHOTO));

        Ok(Artist {
            id: record.id,
            name,
            description,
            status,
            photo,
            tracks,
            albums,
        })
    }

    async fn all_collections(&self) -> Result<Vec<Collection>> {
        self.list_collections(&ListOptions::none()).await
    }

    async fn collections_by_ids(&self, ids: &[String]) -> Result<Vec<Collection>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut collections = Vec::with_capacity(ids.len());
        for batch in ids.chunks(ID_BATCH_SIZE) {
            let options = ListOptions::filtered(Filter::any_record_ids(batch.iter().cloned()));
            collections.extend(self.list_collections(&options).await?);
        }
        Ok(collections)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User> {
        self.auth_login(email, password).await
    }

    async fn register(&self, email: &str, password: &str, name: &str) -> Result<User> {
        self.auth_register(email, password, name).await
    }

    async fn update_user_id_sets(&self, user_id: &str, update: &IdSetUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        let mut patch = Map::new();
        if let Some(ids) = &update.liked_tracks {
            patch.insert(fields::LIKED_TRACKS.into(), ids_value(ids));
        }
        if let Some(ids) = &update.liked_artists {
            patch.insert(fields::LIKED_ARTISTS.into(), ids_value(ids));
        }
        if let Some(ids) = &update.favorite_collections {
            patch.insert(fields::FAVORITE_COLLECTIONS.into(), ids_value(ids));
        }
        self.store.update(&self.tables().users, user_id, patch).await?;
        Ok(())
    }

    async fn set_track_counter(
        &self,
        track_id: &str,
        field: CounterField,
        value: u64,
    ) -> Result<()> {
        let mut patch = Map::new();
        patch.insert(field.field_name().into(), Value::from(value));
        self.store.update(&self.tables().tracks, track_id, patch).await?;
        Ok(())
    }

    async fn set_collection_track_ids(
        &self,
        collection_id: &str,
        track_ids: &[String],
    ) -> Result<()> {
        let mut patch = Map::new();
        patch.insert(fields::TRACKS.into(), ids_value(track_ids));
        self.store
            .update(&self.tables().collections, collection_id, patch)
            .await?;
        Ok(())
    }

    async fn set_listening_minutes(&self, user_id: &str, minutes: f64) -> Result<()> {
        let mut patch = Map::new();
        patch.insert(fields::LISTENING_MINUTES.into(), Value::from(minutes));
        self.store.update(&self.tables().users, user_id, patch).await?;
        Ok(())
    }
}

fn ids_value(ids: &[String]) -> Value {
    Value::Array(ids.iter().cloned().map(Value::String).collect())
}

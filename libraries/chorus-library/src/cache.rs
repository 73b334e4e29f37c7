//! Normalized in-memory catalog cache.
//!
//! The cache is keyed by record id and carries an epoch counter. The epoch
//! is bumped on [`LibraryCache::clear`], so a hydration that started before a
//! sign-out can detect that its result belongs to an abandoned session and
//! must be discarded.

use chorus_core::{Collection, SimpleArtist, Track};
use std::collections::HashMap;

/// Normalized maps of every catalog entity the player has seen.
#[derive(Debug, Default)]
pub struct LibraryCache {
    tracks: HashMap<String, Track>,
    artists: HashMap<String, SimpleArtist>,
    collections: HashMap<String, Collection>,
    epoch: u64,
    hydrated: bool,
}

impl LibraryCache {
    /// An empty cache at epoch zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current cache epoch. Bumped on every [`clear`](Self::clear).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a full-catalog hydration has completed for this epoch.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub(crate) fn mark_hydrated(&mut self) {
        self.hydrated = true;
    }

    /// Drop everything and start a new epoch. Called on sign-out.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.artists.clear();
        self.collections.clear();
        self.hydrated = false;
        self.epoch += 1;
    }

    /// Merge incoming tracks.
    ///
    /// For a track already cached, the local `likes` and `listens` counters
    /// win over the incoming values, so a hydration snapshot taken before an
    /// optimistic counter bump cannot regress it. Collection projections are
    /// recomputed afterwards.
    pub fn merge_tracks(&mut self, incoming: Vec<Track>) {
        for mut track in incoming {
            if let Some(existing) = self.tracks.get(&track.id) {
                track.likes = existing.likes;
                track.listens = existing.listens;
            }
            self.tracks.insert(track.id.clone(), track);
        }
        self.resolve_collections();
    }

    /// Merge incoming artists, replacing cached entries wholesale.
    pub fn merge_artists(&mut self, incoming: Vec<SimpleArtist>) {
        for artist in incoming {
            self.artists.insert(artist.id.clone(), artist);
        }
    }

    /// Merge incoming collections, then recompute their track projections.
    pub fn merge_collections(&mut self, incoming: Vec<Collection>) {
        for collection in incoming {
            self.collections.insert(collection.id.clone(), collection);
        }
        self.resolve_collections();
    }

    /// Recompute every collection's `tracks` projection from its id list.
    pub fn resolve_collections(&mut self) {
        for collection in self.collections.values_mut() {
            collection.resolve_tracks(&self.tracks);
        }
    }

    /// Look up a track.
    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.get(id)
    }

    pub(crate) fn track_mut(&mut self, id: &str) -> Option<&mut Track> {
        self.tracks.get_mut(id)
    }

    /// Look up an artist.
    pub fn artist(&self, id: &str) -> Option<&SimpleArtist> {
        self.artists.get(id)
    }

    /// Look up a collection.
    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.get(id)
    }

    pub(crate) fn collection_mut(&mut self, id: &str) -> Option<&mut Collection> {
        self.collections.get_mut(id)
    }

    /// The user's implicit favorites collection, if loaded.
    pub fn favorites_collection(&self) -> Option<&Collection> {
        self.collections.values().find(|c| c.is_favorites)
    }

    /// All cached tracks, title-sorted.
    pub fn tracks_sorted(&self) -> Vec<&Track> {
        let mut tracks: Vec<_> = self.tracks.values().collect();
        tracks.sort_by(|a, b| a.title.cmp(&b.title));
        tracks
    }

    /// All cached artists, name-sorted.
    pub fn artists_sorted(&self) -> Vec<&SimpleArtist> {
        let mut artists: Vec<_> = self.artists.values().collect();
        artists.sort_by(|a, b| a.name.cmp(&b.name));
        artists
    }

    /// All cached collections, name-sorted.
    pub fn collections_sorted(&self) -> Vec<&Collection> {
        let mut collections: Vec<_> = self.collections.values().collect();
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        collections
    }

    /// Artist id to name lookup, the table track decoding resolves against.
    pub fn artist_names(&self) -> HashMap<String, String> {
        self.artists
            .values()
            .map(|a| (a.id.clone(), a.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::{ArtistRef, CollectionKind, ImageAsset};

    fn track(id: &str, likes: u64, listens: u64) -> Track {
        Track {
            id: id.into(),
            title: format!("Track {id}"),
            artists: vec![ArtistRef {
                id: "a1".into(),
                name: "Artist".into(),
            }],
            lyrics: String::new(),
            audio_url: format!("https://cdn.example/{id}.mp3"),
            cover: ImageAsset::full_only("https://img.example/cover.png"),
            likes,
            listens,
            clip_url: None,
            explicit: false,
        }
    }

    fn collection(id: &str, track_ids: &[&str]) -> Collection {
        Collection {
            id: id.into(),
            name: format!("Collection {id}"),
            description: String::new(),
            cover: ImageAsset::full_only("https://img.example/c.png"),
            cover_video_url: None,
            track_ids: track_ids.iter().map(|s| (*s).to_string()).collect(),
            tracks: vec![],
            is_favorites: false,
            kind: CollectionKind::Playlist,
            artist_id: None,
            release_date: None,
        }
    }

    #[test]
    fn merge_keeps_local_counters_for_cached_tracks() {
        let mut cache = LibraryCache::new();
        cache.merge_tracks(vec![track("t1", 5, 10)]);

        // A stale snapshot arrives after local bumps
        cache.merge_tracks(vec![track("t1", 4, 9), track("t2", 1, 1)]);

        assert_eq!(cache.track("t1").unwrap().likes, 5);
        assert_eq!(cache.track("t1").unwrap().listens, 10);
        assert_eq!(cache.track("t2").unwrap().likes, 1);
    }

    #[test]
    fn merge_refreshes_non_counter_fields() {
        let mut cache = LibraryCache::new();
        cache.merge_tracks(vec![track("t1", 5, 10)]);

        let mut renamed = track("t1", 0, 0);
        renamed.title = "Remastered".into();
        cache.merge_tracks(vec![renamed]);

        assert_eq!(cache.track("t1").unwrap().title, "Remastered");
        assert_eq!(cache.track("t1").unwrap().likes, 5);
    }

    #[test]
    fn collection_projections_follow_track_merges() {
        let mut cache = LibraryCache::new();
        cache.merge_collections(vec![collection("c1", &["t1", "t2"])]);
        assert!(cache.collection("c1").unwrap().tracks.is_empty());

        cache.merge_tracks(vec![track("t1", 0, 0)]);
        let resolved = &cache.collection("c1").unwrap().tracks;
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "t1");
    }

    #[test]
    fn clear_bumps_the_epoch_and_drops_everything() {
        let mut cache = LibraryCache::new();
        cache.merge_tracks(vec![track("t1", 0, 0)]);
        cache.mark_hydrated();
        assert_eq!(cache.epoch(), 0);

        cache.clear();
        assert_eq!(cache.epoch(), 1);
        assert!(cache.track("t1").is_none());
        assert!(!cache.is_hydrated());
    }
}

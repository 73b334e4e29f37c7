//! Integration tests for the library facade over a fake remote catalog.

use async_trait::async_trait;
use chorus_core::{
    Artist, ArtistRef, Collection, CollectionKind, ImageAsset, SimpleArtist, Track, User,
};
use chorus_library::{Library, LibraryError, LikeTarget, MemoryCheckpoint, UserCheckpoint};
use chorus_store::{CounterField, IdSetUpdate, RemoteCatalog, StoreError};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum RemoteWrite {
    IdSets {
        user_id: String,
        update: IdSetUpdate,
    },
    Counter {
        track_id: String,
        field: CounterField,
        value: u64,
    },
    CollectionTracks {
        collection_id: String,
        track_ids: Vec<String>,
    },
    ListeningMinutes {
        user_id: String,
        minutes: f64,
    },
}

/// Catalog fake serving fixture data and recording every write.
#[derive(Default)]
struct FakeCatalog {
    tracks: Vec<Track>,
    artists: Vec<SimpleArtist>,
    collections: Vec<Collection>,
    account: Option<User>,
    writes: Mutex<Vec<RemoteWrite>>,
    fail_writes: AtomicBool,
}

impl FakeCatalog {
    fn writes(&self) -> Vec<RemoteWrite> {
        self.writes.lock().unwrap().clone()
    }

    fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, write: RemoteWrite) -> chorus_store::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 422,
                message: "write rejected".into(),
            });
        }
        self.writes.lock().unwrap().push(write);
        Ok(())
    }
}

#[async_trait]
impl RemoteCatalog for FakeCatalog {
    async fn all_tracks(
        &self,
        _artist_names: &HashMap<String, String>,
    ) -> chorus_store::Result<Vec<Track>> {
        Ok(self.tracks.clone())
    }

    async fn tracks_by_ids(
        &self,
        ids: &[String],
        _artist_names: &HashMap<String, String>,
    ) -> chorus_store::Result<Vec<Track>> {
        Ok(self
            .tracks
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn all_artists(&self) -> chorus_store::Result<Vec<SimpleArtist>> {
        Ok(self.artists.clone())
    }

    async fn artists_by_ids(&self, ids: &[String]) -> chorus_store::Result<Vec<SimpleArtist>> {
        Ok(self
            .artists
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn artist_details(
        &self,
        artist_id: &str,
        _artist_names: &HashMap<String, String>,
    ) -> chorus_store::Result<Artist> {
        let artist = self
            .artists
            .iter()
            .find(|a| a.id == artist_id)
            .ok_or_else(|| StoreError::RecordNotFound(artist_id.to_string()))?;
        Ok(Artist {
            id: artist.id.clone(),
            name: artist.name.clone(),
            description: String::new(),
            status: None,
            photo: artist.photo.clone(),
            tracks: self
                .tracks
                .iter()
                .filter(|t| t.artists.iter().any(|a| a.id == artist_id))
                .cloned()
                .collect(),
            albums: vec![],
        })
    }

    async fn all_collections(&self) -> chorus_store::Result<Vec<Collection>> {
        Ok(self.collections.clone())
    }

    async fn collections_by_ids(&self, ids: &[String]) -> chorus_store::Result<Vec<Collection>> {
        Ok(self
            .collections
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn login(&self, email: &str, _password: &str) -> chorus_store::Result<User> {
        self.account
            .clone()
            .filter(|u| u.email == email)
            .ok_or(StoreError::InvalidCredentials)
    }

    async fn register(&self, email: &str, _password: &str, name: &str) -> chorus_store::Result<User> {
        Ok(User {
            id: "new-user".into(),
            email: email.into(),
            name: name.into(),
            avatar: None,
            liked_track_ids: vec![],
            liked_artist_ids: vec![],
            favorite_collection_ids: vec![],
            listening_minutes: 0.0,
        })
    }

    async fn update_user_id_sets(
        &self,
        user_id: &str,
        update: &IdSetUpdate,
    ) -> chorus_store::Result<()> {
        self.record(RemoteWrite::IdSets {
            user_id: user_id.into(),
            update: update.clone(),
        })
    }

    async fn set_track_counter(
        &self,
        track_id: &str,
        field: CounterField,
        value: u64,
    ) -> chorus_store::Result<()> {
        self.record(RemoteWrite::Counter {
            track_id: track_id.into(),
            field,
            value,
        })
    }

    async fn set_collection_track_ids(
        &self,
        collection_id: &str,
        track_ids: &[String],
    ) -> chorus_store::Result<()> {
        self.record(RemoteWrite::CollectionTracks {
            collection_id: collection_id.into(),
            track_ids: track_ids.to_vec(),
        })
    }

    async fn set_listening_minutes(&self, user_id: &str, minutes: f64) -> chorus_store::Result<()> {
        self.record(RemoteWrite::ListeningMinutes {
            user_id: user_id.into(),
            minutes,
        })
    }
}

fn track(id: &str, title: &str, likes: u64, listens: u64) -> Track {
    Track {
        id: id.into(),
        title: title.into(),
        artists: vec![ArtistRef {
            id: "a1".into(),
            name: "Moon Artist".into(),
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

fn collection(
    id: &str,
    name: &str,
    track_ids: &[&str],
    is_favorites: bool,
    release_date: Option<NaiveDate>,
) -> Collection {
    Collection {
        id: id.into(),
        name: name.into(),
        description: String::new(),
        cover: ImageAsset::full_only("https://img.example/c.png"),
        cover_video_url: None,
        track_ids: track_ids.iter().map(|s| (*s).to_string()).collect(),
        tracks: vec![],
        is_favorites,
        kind: if is_favorites {
            CollectionKind::Playlist
        } else {
            CollectionKind::Album
        },
        artist_id: (!is_favorites).then(|| "a1".to_string()),
        release_date,
    }
}

fn fixture() -> FakeCatalog {
    FakeCatalog {
        tracks: vec![
            track("t1", "Night Drive", 5, 10),
            track("t2", "Daylight", 5, 3),
            track("t3", "Hidden Gem", 0, 0),
        ],
        artists: vec![SimpleArtist {
            id: "a1".into(),
            name: "Moon Artist".into(),
            photo: None,
        }],
        collections: vec![
            collection("fav", "Favorites", &["t1"], true, None),
            collection("alb", "Midnight Album", &["t1", "t2"], false, None),
        ],
        account: Some(User {
            id: "u1".into(),
            email: "listener@example.com".into(),
            name: "Listener".into(),
            avatar: None,
            // Stale on purpose: the favorites playlist is the source of truth
            liked_track_ids: vec!["stale".into()],
            liked_artist_ids: vec![],
            favorite_collection_ids: vec!["fav".into(), "alb".into()],
            listening_minutes: 0.0,
        }),
        ..FakeCatalog::default()
    }
}

fn library(catalog: FakeCatalog) -> (Library, Arc<FakeCatalog>, Arc<MemoryCheckpoint>) {
    let catalog = Arc::new(catalog);
    let checkpoint = Arc::new(MemoryCheckpoint::new());
    let library = Library::new(
        Arc::clone(&catalog) as Arc<dyn RemoteCatalog>,
        Arc::clone(&checkpoint) as Arc<dyn UserCheckpoint>,
    );
    (library, catalog, checkpoint)
}

async fn signed_in_library() -> (Library, Arc<FakeCatalog>, Arc<MemoryCheckpoint>) {
    let (library, catalog, checkpoint) = library(fixture());
    library
        .sign_in("listener@example.com", "secret")
        .await
        .unwrap();
    (library, catalog, checkpoint)
}

#[tokio::test]
async fn sign_in_loads_the_shelf_and_reconciles_liked_tracks() {
    let (library, _, checkpoint) = signed_in_library().await;

    let user = library.current_user().await.unwrap();
    assert_eq!(user.liked_track_ids, vec!["t1".to_string()]);

    // Shelf tracks are cached, the unreferenced one is not yet
    let tracks = library.tracks().await;
    let ids: Vec<_> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert!(ids.contains(&"t1") && ids.contains(&"t2"));
    assert!(!ids.contains(&"t3"));

    // The reconciled user is what the checkpoint holds
    let saved = checkpoint.load().unwrap().unwrap();
    assert_eq!(saved.liked_track_ids, vec!["t1".to_string()]);
}

#[tokio::test]
async fn sign_in_with_bad_credentials_fails() {
    let (library, _, _) = library(fixture());
    let err = library.sign_in("nobody@example.com", "secret").await;
    assert!(matches!(
        err,
        Err(LibraryError::Store(StoreError::InvalidCredentials))
    ));
    assert!(library.current_user().await.is_none());
}

#[tokio::test]
async fn liking_a_track_pushes_all_three_remote_writes() {
    let (library, catalog, _) = signed_in_library().await;

    library.toggle_like(LikeTarget::Track, "t2").await.unwrap();

    let writes = catalog.writes();
    assert!(writes.contains(&RemoteWrite::IdSets {
        user_id: "u1".into(),
        update: IdSetUpdate {
            liked_tracks: Some(vec!["t1".into(), "t2".into()]),
            ..IdSetUpdate::default()
        },
    }));
    assert!(writes.contains(&RemoteWrite::Counter {
        track_id: "t2".into(),
        field: CounterField::Likes,
        value: 6,
    }));
    assert!(writes.contains(&RemoteWrite::CollectionTracks {
        collection_id: "fav".into(),
        track_ids: vec!["t1".into(), "t2".into()],
    }));
}

#[tokio::test]
async fn failed_like_rolls_back_to_the_exact_snapshot() {
    let (library, catalog, checkpoint) = signed_in_library().await;
    catalog.fail_writes(true);

    let result = library.toggle_like(LikeTarget::Track, "t2").await;
    assert!(matches!(
        result,
        Err(LibraryError::Store(StoreError::Api { status: 422, .. }))
    ));

    let user = library.current_user().await.unwrap();
    assert_eq!(user.liked_track_ids, vec!["t1".to_string()]);

    let tracks = library.tracks().await;
    let t2 = tracks.iter().find(|t| t.id == "t2").unwrap();
    assert_eq!(t2.likes, 5, "counter restored");

    let favorites = library
        .collections()
        .await
        .into_iter()
        .find(|c| c.is_favorites)
        .unwrap();
    assert_eq!(favorites.track_ids, vec!["t1".to_string()]);

    // The rolled-back user is re-persisted
    let saved = checkpoint.load().unwrap().unwrap();
    assert_eq!(saved.liked_track_ids, vec!["t1".to_string()]);
}

#[tokio::test]
async fn record_play_keeps_the_local_bump_when_the_remote_fails() {
    let (library, catalog, _) = signed_in_library().await;
    catalog.fail_writes(true);

    library.record_play("t1").await.unwrap();

    let tracks = library.tracks().await;
    let t1 = tracks.iter().find(|t| t.id == "t1").unwrap();
    assert_eq!(t1.listens, 11);
}

#[tokio::test]
async fn hydration_adds_the_full_catalog_without_regressing_counters() {
    let (library, _, _) = signed_in_library().await;
    library.record_play("t1").await.unwrap();

    library.hydrate().await.unwrap();

    let tracks = library.tracks().await;
    let ids: Vec<_> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert!(ids.contains(&"t3"), "full catalog cached");

    let t1 = tracks.iter().find(|t| t.id == "t1").unwrap();
    assert_eq!(t1.listens, 11, "local counter survives the merge");
}

#[tokio::test]
async fn sign_out_clears_everything() {
    let (library, _, checkpoint) = signed_in_library().await;
    library.hydrate().await.unwrap();

    library.sign_out().await.unwrap();

    assert!(library.current_user().await.is_none());
    assert!(library.tracks().await.is_empty());
    assert!(library.collections().await.is_empty());
    assert!(checkpoint.load().unwrap().is_none());
}

#[tokio::test]
async fn restore_resumes_the_checkpointed_session() {
    let (library, catalog, checkpoint) = signed_in_library().await;
    drop(library);

    let restored = Library::new(
        Arc::clone(&catalog) as Arc<dyn RemoteCatalog>,
        Arc::clone(&checkpoint) as Arc<dyn UserCheckpoint>,
    );
    let user = restored.restore().await.unwrap().unwrap();
    assert_eq!(user.id, "u1");
    assert!(!restored.tracks().await.is_empty());
}

#[tokio::test]
async fn restore_without_a_checkpoint_is_none() {
    let (library, _, _) = library(fixture());
    assert!(library.restore().await.unwrap().is_none());
}

#[tokio::test]
async fn upcoming_release_refuses_to_open_until_the_day_after() {
    let mut catalog = fixture();
    let release = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
    catalog.collections.push(collection(
        "up",
        "Upcoming EP",
        &["t3"],
        false,
        Some(release),
    ));
    let (library, _, _) = library(catalog);
    library
        .sign_in("listener@example.com", "secret")
        .await
        .unwrap();
    library.hydrate().await.unwrap();

    let locked = library.open_collection("up", release).await;
    assert!(matches!(
        locked,
        Err(LibraryError::UpcomingRelease { name }) if name == "Upcoming EP"
    ));

    let day_after = NaiveDate::from_ymd_opt(2024, 6, 6).unwrap();
    let open = library.open_collection("up", day_after).await.unwrap();
    assert_eq!(open.id, "up");
}

#[tokio::test]
async fn open_collection_resolves_tracks() {
    let (library, _, _) = signed_in_library().await;
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let album = library.open_collection("alb", today).await.unwrap();
    let titles: Vec<_> = album.tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Night Drive", "Daylight"]);
}

#[tokio::test]
async fn search_matches_titles_artists_and_collections() {
    let (library, _, _) = signed_in_library().await;
    library.hydrate().await.unwrap();

    let results = library.search("night").await;
    assert_eq!(results.tracks.len(), 1);
    assert_eq!(results.tracks[0].title, "Night Drive");
    assert_eq!(results.collections.len(), 1);
    assert_eq!(results.collections[0].name, "Midnight Album");

    let by_artist = library.search("moon").await;
    assert_eq!(by_artist.artists.len(), 1);
    assert_eq!(by_artist.tracks.len(), 3, "artist line matches every track");

    assert!(library.search("   ").await.is_empty());
}

#[tokio::test]
async fn artist_details_overlay_locally_bumped_counters() {
    let (library, _, _) = signed_in_library().await;
    library.toggle_like(LikeTarget::Track, "t2").await.unwrap();

    let artist = library.artist_details("a1").await.unwrap();
    let t2 = artist.tracks.iter().find(|t| t.id == "t2").unwrap();
    assert_eq!(t2.likes, 6, "remote snapshot does not mask the local bump");
}

#[tokio::test]
async fn playback_queue_projects_cached_tracks() {
    let (library, _, _) = signed_in_library().await;

    let queue = library.playback_queue().await;
    let daylight = queue.iter().find(|t| t.id == "t2").unwrap();
    assert_eq!(daylight.title, "Daylight");
    assert_eq!(daylight.artist, "Moon Artist");
    assert!(daylight.audio_url.ends_with("t2.mp3"));
}

#[tokio::test(start_paused = true)]
async fn listening_time_accrues_per_tick_and_stops_cleanly() {
    let (library, catalog, checkpoint) = signed_in_library().await;
    library.start_listening_with_tick(Duration::from_secs(5));

    // Two full ticks
    tokio::time::sleep(Duration::from_millis(10_100)).await;
    library.stop_listening();

    let minutes = library.current_user().await.unwrap().listening_minutes;
    assert!((minutes - 2.0 * 5.0 / 60.0).abs() < 1e-9);

    let pushes: Vec<_> = catalog
        .writes()
        .into_iter()
        .filter(|w| matches!(w, RemoteWrite::ListeningMinutes { .. }))
        .collect();
    assert_eq!(pushes.len(), 2);

    // Each tick checkpointed the credit
    let saved = checkpoint.load().unwrap().unwrap();
    assert!((saved.listening_minutes - minutes).abs() < 1e-9);

    // No credit after stop
    tokio::time::sleep(Duration::from_secs(30)).await;
    let after = library.current_user().await.unwrap().listening_minutes;
    assert!((after - minutes).abs() < 1e-9);
}

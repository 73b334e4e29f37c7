//! Library facade.
//!
//! Owns the shared state, the remote catalog, and the user checkpoint, and
//! exposes the operations the player shell calls. Construction and teardown
//! are explicit; nothing here is a global.

use crate::error::{LibraryError, Result};
use crate::listening::{ListeningTracker, DEFAULT_LISTENING_TICK};
use crate::loader;
use crate::mutation::{self, run_optimistic, LikeTarget, ToggleLike};
use crate::persist::UserCheckpoint;
use crate::state::LibraryState;
use chorus_core::{Artist, Collection, SimpleArtist, Track, User};
use chorus_playback::QueueTrack;
use chorus_store::RemoteCatalog;
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Results of a library search.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Matching tracks
    pub tracks: Vec<Track>,

    /// Matching artists
    pub artists: Vec<SimpleArtist>,

    /// Matching collections
    pub collections: Vec<Collection>,
}

impl SearchResults {
    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.artists.is_empty() && self.collections.is_empty()
    }
}

/// The user's library: cache, session, mutations, and persistence.
pub struct Library {
    state: Arc<RwLock<LibraryState>>,
    catalog: Arc<dyn RemoteCatalog>,
    checkpoint: Arc<dyn UserCheckpoint>,
    listening: StdMutex<Option<ListeningTracker>>,
}

impl Library {
    /// Build a library over the given catalog and checkpoint.
    pub fn new(catalog: Arc<dyn RemoteCatalog>, checkpoint: Arc<dyn UserCheckpoint>) -> Self {
        Self {
            state: Arc::new(RwLock::new(LibraryState::new())),
            catalog,
            checkpoint,
            listening: StdMutex::new(None),
        }
    }

    /// Handle to the shared state, for embedding shells that render from it.
    pub fn state(&self) -> Arc<RwLock<LibraryState>> {
        Arc::clone(&self.state)
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Sign in and load the user's shelf.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let user = self.catalog.login(email, password).await?;
        info!(user_id = %user.id, "Signed in");
        self.start_session(user).await
    }

    /// Create an account and load the (empty) shelf.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User> {
        let user = self.catalog.register(email, password, name).await?;
        info!(user_id = %user.id, "Registered");
        self.start_session(user).await
    }

    /// Restore the session from the local checkpoint, if one exists.
    ///
    /// The checkpointed user signs in immediately; the shelf load runs
    /// against the remote store and a failure there leaves the session
    /// usable from local data alone.
    pub async fn restore(&self) -> Result<Option<User>> {
        let Some(user) = self.checkpoint.load()? else {
            return Ok(None);
        };
        debug!(user_id = %user.id, "Restoring session from checkpoint");

        let mut guard = self.state.write().await;
        guard.user = Some(user);
        if let Err(e) = loader::load_essential(self.catalog.as_ref(), &mut guard).await {
            warn!(error = %e, "Shelf load failed during restore, continuing offline");
        }
        Ok(guard.user.clone())
    }

    async fn start_session(&self, user: User) -> Result<User> {
        self.checkpoint.save(&user)?;
        let mut guard = self.state.write().await;
        guard.user = Some(user);
        loader::load_essential(self.catalog.as_ref(), &mut guard).await?;

        // Reconciliation may have edited the liked set; checkpoint the result
        let user = guard.user.clone().ok_or(LibraryError::NotSignedIn)?;
        self.checkpoint.save(&user)?;
        Ok(user)
    }

    /// Sign out: stop accrual, drop the checkpoint, clear the cache.
    ///
    /// Clearing bumps the cache epoch, so a hydration still in flight for
    /// the old session is discarded when it lands.
    pub async fn sign_out(&self) -> Result<()> {
        self.stop_listening();
        self.checkpoint.clear()?;

        let mut guard = self.state.write().await;
        guard.user = None;
        guard.cache.clear();
        info!("Signed out");
        Ok(())
    }

    /// Fetch the full catalog and merge it into the cache.
    ///
    /// The fetch runs without the state lock. If a sign-out happened in the
    /// meantime the merged epoch no longer matches and the result is thrown
    /// away.
    pub async fn hydrate(&self) -> Result<()> {
        let epoch = self.state.read().await.cache.epoch();

        let artists = self.catalog.all_artists().await?;
        let artist_names: std::collections::HashMap<_, _> = artists
            .iter()
            .map(|a| (a.id.clone(), a.name.clone()))
            .collect();
        let tracks = self.catalog.all_tracks(&artist_names).await?;
        let collections = self.catalog.all_collections().await?;

        let mut guard = self.state.write().await;
        if guard.cache.epoch() != epoch {
            debug!(
                started = epoch,
                current = guard.cache.epoch(),
                "Discarding hydration from an abandoned session"
            );
            return Ok(());
        }
        guard.cache.merge_artists(artists);
        guard.cache.merge_tracks(tracks);
        guard.cache.merge_collections(collections);
        guard.cache.mark_hydrated();
        info!("Catalog hydrated");
        Ok(())
    }

    /// Toggle like membership for a track, artist, or collection.
    pub async fn toggle_like(&self, target: LikeTarget, id: &str) -> Result<()> {
        let command = ToggleLike {
            target,
            id: id.to_string(),
        };
        run_optimistic(
            &self.state,
            self.catalog.as_ref(),
            self.checkpoint.as_ref(),
            &command,
        )
        .await
    }

    /// Record one play of a track. The remote write is best-effort.
    pub async fn record_play(&self, track_id: &str) -> Result<()> {
        mutation::record_play(&self.state, self.catalog.as_ref(), track_id).await
    }

    /// Start listening-time accrual with the default tick.
    pub fn start_listening(&self) {
        self.start_listening_with_tick(DEFAULT_LISTENING_TICK);
    }

    /// Start listening-time accrual with a custom tick.
    pub fn start_listening_with_tick(&self, tick: Duration) {
        let tracker = ListeningTracker::start(
            Arc::clone(&self.state),
            Arc::clone(&self.catalog),
            Arc::clone(&self.checkpoint),
            tick,
        );
        let mut slot = self.listening.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut old) = slot.replace(tracker) {
            old.stop();
        }
    }

    /// Stop listening-time accrual. Idempotent.
    pub fn stop_listening(&self) {
        let mut slot = self.listening.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut tracker) = slot.take() {
            tracker.stop();
        }
    }

    /// Case-insensitive substring search over the cached catalog.
    pub async fn search(&self, query: &str) -> SearchResults {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return SearchResults::default();
        }

        let guard = self.state.read().await;
        let cache = &guard.cache;
        SearchResults {
            tracks: cache
                .tracks_sorted()
                .into_iter()
                .filter(|t| {
                    t.title.to_lowercase().contains(&needle)
                        || t.artist_line().to_lowercase().contains(&needle)
                })
                .cloned()
                .collect(),
            artists: cache
                .artists_sorted()
                .into_iter()
                .filter(|a| a.name.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
            collections: cache
                .collections_sorted()
                .into_iter()
                .filter(|c| c.name.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
        }
    }

    /// Open a collection for display, with its tracks resolved.
    ///
    /// A future-dated release is refused with
    /// [`LibraryError::UpcomingRelease`]; it unlocks the day after its
    /// release date.
    pub async fn open_collection(&self, id: &str, today: NaiveDate) -> Result<Collection> {
        let guard = self.state.read().await;
        let collection = guard
            .cache
            .collection(id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        if collection.is_upcoming(today) {
            return Err(LibraryError::UpcomingRelease {
                name: collection.name.clone(),
            });
        }
        Ok(collection.clone())
    }

    /// Fetch the full artist detail, overlaying locally bumped counters so a
    /// just-liked track does not flicker back to its remote count.
    pub async fn artist_details(&self, artist_id: &str) -> Result<Artist> {
        let artist_names = self.state.read().await.cache.artist_names();
        let mut artist = self.catalog.artist_details(artist_id, &artist_names).await?;

        let guard = self.state.read().await;
        for track in &mut artist.tracks {
            if let Some(cached) = guard.cache.track(&track.id) {
                track.likes = cached.likes;
                track.listens = cached.listens;
            }
        }
        Ok(artist)
    }

    /// All cached tracks, title-sorted.
    pub async fn tracks(&self) -> Vec<Track> {
        let guard = self.state.read().await;
        guard.cache.tracks_sorted().into_iter().cloned().collect()
    }

    /// All cached artists, name-sorted.
    pub async fn artists(&self) -> Vec<SimpleArtist> {
        let guard = self.state.read().await;
        guard.cache.artists_sorted().into_iter().cloned().collect()
    }

    /// All cached collections, name-sorted.
    pub async fn collections(&self) -> Vec<Collection> {
        let guard = self.state.read().await;
        guard
            .cache
            .collections_sorted()
            .into_iter()
            .cloned()
            .collect()
    }

    /// The cached catalog as a playback queue, title-sorted.
    pub async fn playback_queue(&self) -> Vec<QueueTrack> {
        let guard = self.state.read().await;
        guard
            .cache
            .tracks_sorted()
            .into_iter()
            .map(queue_track)
            .collect()
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

/// Project a catalog track into the playback queue shape.
pub fn queue_track(track: &Track) -> QueueTrack {
    QueueTrack {
        id: track.id.clone(),
        title: track.title.clone(),
        artist: track.artist_line(),
        audio_url: track.audio_url.clone(),
    }
}

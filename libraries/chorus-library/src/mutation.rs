//! Optimistic mutation engine.
//!
//! A command applies to local state first, the checkpoint is saved, and the
//! remote write follows. On a remote failure the command restores the exact
//! pre-apply snapshot from its undo value and the checkpoint is saved again.
//! No re-fetch is involved; rollback is a pure in-memory restore.

use crate::error::{LibraryError, Result};
use crate::persist::UserCheckpoint;
use crate::state::LibraryState;
use async_trait::async_trait;
use chorus_core::User;
use chorus_store::{CounterField, IdSetUpdate, RemoteCatalog};
use tokio::sync::RwLock;
use tracing::warn;

/// A mutation with optimistic local application and remote commit.
#[async_trait]
pub trait OptimisticCommand: Send + Sync {
    /// Snapshot needed to restore the pre-apply state.
    type Undo: Send;

    /// Apply the mutation to local state, returning the undo snapshot.
    fn apply(&self, state: &mut LibraryState) -> Result<Self::Undo>;

    /// Push the applied mutation to the remote store.
    async fn commit(&self, state: &LibraryState, catalog: &dyn RemoteCatalog) -> Result<()>;

    /// Restore the pre-apply snapshot.
    fn rollback(&self, state: &mut LibraryState, undo: Self::Undo);
}

/// Run a command through the apply / persist / commit / rollback cycle.
///
/// The write lock is held across the remote commit, so concurrent commands
/// serialize and each one commits the state it actually applied to.
pub async fn run_optimistic<C: OptimisticCommand>(
    state: &RwLock<LibraryState>,
    catalog: &dyn RemoteCatalog,
    checkpoint: &dyn UserCheckpoint,
    command: &C,
) -> Result<()> {
    let mut guard = state.write().await;
    let undo = command.apply(&mut guard)?;
    persist_user(&guard, checkpoint);

    match command.commit(&guard, catalog).await {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(error = %e, "Remote write failed, rolling back");
            command.rollback(&mut guard, undo);
            persist_user(&guard, checkpoint);
            Err(e)
        }
    }
}

fn persist_user(state: &LibraryState, checkpoint: &dyn UserCheckpoint) {
    if let Some(user) = &state.user {
        if let Err(e) = checkpoint.save(user) {
            warn!(error = %e, "Failed to save user checkpoint");
        }
    }
}

/// What a like toggle targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    /// A track; also adjusts its like counter and the favorites playlist
    Track,

    /// An artist
    Artist,

    /// A collection (album added to / removed from favorites)
    Collection,
}

/// Toggle like membership for a track, artist, or collection.
///
/// For tracks this is a three-part edit made atomically on local state: the
/// user's liked-track id set, the track's like counter, and the favorites
/// collection's track-id list, which mirrors the liked set by invariant.
#[derive(Debug, Clone)]
pub struct ToggleLike {
    /// What kind of entity the id names
    pub target: LikeTarget,

    /// Id of the entity to toggle
    pub id: String,
}

/// Pre-apply snapshot for [`ToggleLike`].
pub struct LikeUndo {
    user: User,
    track_likes: Option<(String, u64)>,
    favorites_track_ids: Option<(String, Vec<String>)>,
}

#[async_trait]
impl OptimisticCommand for ToggleLike {
    type Undo = LikeUndo;

    fn apply(&self, state: &mut LibraryState) -> Result<LikeUndo> {
        let user_snapshot = state.signed_in_user()?.clone();
        let mut undo = LikeUndo {
            user: user_snapshot,
            track_likes: None,
            favorites_track_ids: None,
        };

        match self.target {
            LikeTarget::Track => {
                if state.cache.track(&self.id).is_none() {
                    return Err(LibraryError::NotFound(self.id.clone()));
                }

                let user = state.signed_in_user_mut()?;
                let liking = !user.likes_track(&self.id);
                toggle_membership(&mut user.liked_track_ids, &self.id);
                let liked_ids = user.liked_track_ids.clone();

                if let Some(track) = state.cache.track_mut(&self.id) {
                    undo.track_likes = Some((self.id.clone(), track.likes));
                    track.likes = if liking {
                        track.likes + 1
                    } else {
                        track.likes.saturating_sub(1)
                    };
                }

                // The favorites playlist mirrors the liked-track set
                let favorites_id = state.cache.favorites_collection().map(|c| c.id.clone());
                if let Some(id) = favorites_id {
                    if let Some(favorites) = state.cache.collection_mut(&id) {
                        undo.favorites_track_ids = Some((id, favorites.track_ids.clone()));
                        favorites.track_ids = liked_ids;
                    }
                }
                state.cache.resolve_collections();
            }
            LikeTarget::Artist => {
                let user = state.signed_in_user_mut()?;
                toggle_membership(&mut user.liked_artist_ids, &self.id);
            }
            LikeTarget::Collection => {
                let user = state.signed_in_user_mut()?;
                toggle_membership(&mut user.favorite_collection_ids, &self.id);
            }
        }

        Ok(undo)
    }

    async fn commit(&self, state: &LibraryState, catalog: &dyn RemoteCatalog) -> Result<()> {
        let user = state.signed_in_user()?;

        match self.target {
            LikeTarget::Track => {
                catalog
                    .update_user_id_sets(
                        &user.id,
                        &IdSetUpdate {
                            liked_tracks: Some(user.liked_track_ids.clone()),
                            ..IdSetUpdate::default()
                        },
                    )
                    .await?;

                if let Some(track) = state.cache.track(&self.id) {
                    catalog
                        .set_track_counter(&self.id, CounterField::Likes, track.likes)
                        .await?;
                }
                if let Some(favorites) = state.cache.favorites_collection() {
                    catalog
                        .set_collection_track_ids(&favorites.id, &favorites.track_ids)
                        .await?;
                }
            }
            LikeTarget::Artist => {
                catalog
                    .update_user_id_sets(
                        &user.id,
                        &IdSetUpdate {
                            liked_artists: Some(user.liked_artist_ids.clone()),
                            ..IdSetUpdate::default()
                        },
                    )
                    .await?;
            }
            LikeTarget::Collection => {
                catalog
                    .update_user_id_sets(
                        &user.id,
                        &IdSetUpdate {
                            favorite_collections: Some(user.favorite_collection_ids.clone()),
                            ..IdSetUpdate::default()
                        },
                    )
                    .await?;
            }
        }

        Ok(())
    }

    fn rollback(&self, state: &mut LibraryState, undo: LikeUndo) {
        state.user = Some(undo.user);
        if let Some((track_id, likes)) = undo.track_likes {
            if let Some(track) = state.cache.track_mut(&track_id) {
                track.likes = likes;
            }
        }
        if let Some((collection_id, track_ids)) = undo.favorites_track_ids {
            if let Some(favorites) = state.cache.collection_mut(&collection_id) {
                favorites.track_ids = track_ids;
            }
        }
        state.cache.resolve_collections();
    }
}

/// Record one play of a track.
///
/// The local counter bump always sticks; the remote write is best-effort and
/// a failure is logged, never rolled back.
pub async fn record_play(
    state: &RwLock<LibraryState>,
    catalog: &dyn RemoteCatalog,
    track_id: &str,
) -> Result<()> {
    let listens = {
        let mut guard = state.write().await;
        let track = guard
            .cache
            .track_mut(track_id)
            .ok_or_else(|| LibraryError::NotFound(track_id.to_string()))?;
        track.listens += 1;
        let listens = track.listens;
        guard.cache.resolve_collections();
        listens
    };

    if let Err(e) = catalog
        .set_track_counter(track_id, CounterField::Listens, listens)
        .await
    {
        warn!(error = %e, track_id, "Failed to push play count");
    }
    Ok(())
}

fn toggle_membership(ids: &mut Vec<String>, id: &str) {
    if let Some(index) = ids.iter().position(|existing| existing == id) {
        ids.remove(index);
    } else {
        ids.push(id.to_string());
    }
}

//! Essential library load.
//!
//! Sign-in loads only what the shelf views need: the artist name table, the
//! user's collections, and the tracks those reference. The full catalog is
//! hydrated later by the facade.

use crate::error::Result;
use crate::state::LibraryState;
use chorus_store::RemoteCatalog;
use std::collections::HashSet;
use tracing::debug;

/// Load the signed-in user's shelf: their collections, the artist table, and
/// the transitive closure of referenced tracks.
///
/// The favorites playlist is the source of truth for liked tracks; the
/// user's `liked_track_ids` is reconciled to its track-id list here.
pub(crate) async fn load_essential(
    catalog: &dyn RemoteCatalog,
    state: &mut LibraryState,
) -> Result<()> {
    let user = state.signed_in_user()?.clone();

    // The artist table doubles as the name-resolution map for track decoding
    let artists = catalog.all_artists().await?;
    state.cache.merge_artists(artists);
    let artist_names = state.cache.artist_names();

    let collections = catalog
        .collections_by_ids(&user.favorite_collection_ids)
        .await?;
    state.cache.merge_collections(collections);

    if let Some(favorites) = state.cache.favorites_collection() {
        let reconciled = favorites.track_ids.clone();
        if let Some(user) = state.user.as_mut() {
            if user.liked_track_ids != reconciled {
                debug!(
                    before = user.liked_track_ids.len(),
                    after = reconciled.len(),
                    "Reconciling liked tracks from the favorites playlist"
                );
                user.liked_track_ids = reconciled;
            }
        }
    }

    let track_ids = referenced_track_ids(state);
    let tracks = catalog.tracks_by_ids(&track_ids, &artist_names).await?;
    state.cache.merge_tracks(tracks);

    Ok(())
}

/// Every track id reachable from the loaded collections and the user's
/// liked set, deduplicated in first-seen order.
fn referenced_track_ids(state: &LibraryState) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    let mut push = |id: &String| {
        if seen.insert(id.clone()) {
            ids.push(id.clone());
        }
    };

    for collection in state.cache.collections_sorted() {
        for id in &collection.track_ids {
            push(id);
        }
    }
    if let Some(user) = &state.user {
        for id in &user.liked_track_ids {
            push(id);
        }
    }

    ids
}

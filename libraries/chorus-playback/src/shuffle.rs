//! Queue shuffling

use crate::types::QueueTrack;
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Shuffle tracks into a random permutation (Fisher-Yates).
///
/// Every track keeps exactly one slot, so a full pass over the shuffled
/// queue visits each track exactly once before any repeat.
pub fn shuffle_tracks(tracks: &mut [QueueTrack]) {
    let mut rng = thread_rng();
    tracks.shuffle(&mut rng);
}

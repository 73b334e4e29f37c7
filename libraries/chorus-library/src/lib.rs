//! Chorus Player - Library
//!
//! The user's library: a normalized catalog cache over the remote record
//! store, an optimistic mutation engine for likes and play counts, a local
//! user checkpoint, and listening-time accrual.
//!
//! Reads go to the cache; the catalog is loaded in two stages (the user's
//! shelf at sign-in, the full catalog in the background). Writes apply to
//! local state first and roll back in memory if the remote store rejects
//! them, so the player stays responsive on a slow or flaky connection.

pub mod cache;
pub mod error;
pub mod library;
pub mod listening;
mod loader;
pub mod mutation;
pub mod persist;
pub mod state;

pub use cache::LibraryCache;
pub use error::{LibraryError, Result};
pub use library::{queue_track, Library, SearchResults};
pub use listening::{ListeningTracker, DEFAULT_LISTENING_TICK};
pub use mutation::{record_play, run_optimistic, LikeTarget, OptimisticCommand, ToggleLike};
pub use persist::{default_checkpoint_path, JsonFileCheckpoint, MemoryCheckpoint, UserCheckpoint};
pub use state::LibraryState;

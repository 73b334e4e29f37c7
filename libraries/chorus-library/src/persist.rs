//! Local user checkpoint.
//!
//! The whole [`User`] is persisted as one JSON object under a fixed path so
//! a session survives restarts, including id-set edits and listening-time
//! credit accumulated offline. Writes go to a sibling temp file and are
//! renamed into place, so a crash mid-write never leaves a torn checkpoint.

use crate::error::Result;
use chorus_core::User;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persistence seam for the signed-in user.
pub trait UserCheckpoint: Send + Sync {
    /// Load the checkpointed user, if one exists.
    fn load(&self) -> Result<Option<User>>;

    /// Replace the checkpoint with the given user.
    fn save(&self, user: &User) -> Result<()>;

    /// Remove the checkpoint. Called on sign-out.
    fn clear(&self) -> Result<()>;
}

/// Checkpoint stored as a JSON file with atomic-rename writes.
pub struct JsonFileCheckpoint {
    path: PathBuf,
}

impl JsonFileCheckpoint {
    /// Checkpoint at the given file path. Parent directories are created on
    /// the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl UserCheckpoint for JsonFileCheckpoint {
    fn load(&self) -> Result<Option<User>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A checkpoint that fails to parse is treated as absent rather than
        // blocking sign-in.
        match serde_json::from_slice(&bytes) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable checkpoint");
                Ok(None)
            }
        }
    }

    fn save(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, serde_json::to_vec_pretty(user)?)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory checkpoint for tests.
#[derive(Default)]
pub struct MemoryCheckpoint {
    user: std::sync::Mutex<Option<User>>,
}

impl MemoryCheckpoint {
    /// Empty checkpoint.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserCheckpoint for MemoryCheckpoint {
    fn load(&self) -> Result<Option<User>> {
        Ok(self.user.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, user: &User) -> Result<()> {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Default checkpoint location under the given data directory.
pub fn default_checkpoint_path(data_dir: &Path) -> PathBuf {
    data_dir.join("user.json")
}

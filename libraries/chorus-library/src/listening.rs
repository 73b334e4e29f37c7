//! Listening-time accrual.
//!
//! While playback is running, a background task credits the user with a
//! fixed slice of listening time per tick. Each tick saves the checkpoint
//! and then awaits the remote push before the next tick fires, so writes
//! for one user are strictly serialized and a slow store cannot pile up
//! concurrent updates.

use crate::persist::UserCheckpoint;
use crate::state::LibraryState;
use chorus_store::RemoteCatalog;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Default accrual tick.
pub const DEFAULT_LISTENING_TICK: Duration = Duration::from_secs(5);

/// Background task crediting listening time while playback runs.
pub struct ListeningTracker {
    handle: Option<JoinHandle<()>>,
}

impl ListeningTracker {
    /// Start the accrual task. Each tick adds `tick / 60` minutes; a tick
    /// interrupted by [`stop`](Self::stop) credits nothing.
    pub fn start(
        state: Arc<RwLock<LibraryState>>,
        catalog: Arc<dyn RemoteCatalog>,
        checkpoint: Arc<dyn UserCheckpoint>,
        tick: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let credit = tick.as_secs_f64() / 60.0;
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately;
            // consume it so no credit is granted at start
            interval.tick().await;

            loop {
                interval.tick().await;

                let update = {
                    let mut guard = state.write().await;
                    let Some(user) = guard.user.as_mut() else {
                        debug!("No signed-in user, stopping listening accrual");
                        break;
                    };
                    user.listening_minutes += credit;
                    if let Err(e) = checkpoint.save(user) {
                        warn!(error = %e, "Failed to checkpoint listening time");
                    }
                    (user.id.clone(), user.listening_minutes)
                };

                let (user_id, minutes) = update;
                if let Err(e) = catalog.set_listening_minutes(&user_id, minutes).await {
                    warn!(error = %e, "Failed to push listening time");
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Abort the accrual task. No partial-tick credit is granted.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ListeningTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

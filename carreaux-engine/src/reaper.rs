//! Idle-session reaper
//!
//! Periodically removes sessions whose last activity is older than the
//! configured threshold. The reaper runs as an explicitly owned tokio task
//! with a stop control, so the hosting process can shut it down cleanly
//! instead of leaking a background timer.

use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use crate::engine::GameEngine;

/// Periodic idle-session sweep over a shared [`GameEngine`]
pub struct Reaper {
    engine: GameEngine,
    sweep_interval: Duration,
    idle_timeout: Duration,
}

impl Reaper {
    pub fn new(engine: GameEngine, sweep_interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            engine,
            sweep_interval,
            idle_timeout,
        }
    }

    /// Start sweeping on a background task
    ///
    /// The returned handle must be kept; dropping it aborts nothing, but
    /// [`ReaperHandle::stop`] is the clean way to wind the task down.
    pub fn spawn(self) -> ReaperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(self.sweep_interval);
            // The first tick of a tokio interval completes immediately;
            // consume it so sweeps start one full interval after spawn
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.engine.sweep_idle(Instant::now(), self.idle_timeout);
                        if removed > 0 {
                            info!(removed, "removed idle sessions");
                        } else {
                            debug!("sweep found no idle sessions");
                        }
                    }

                    _ = &mut shutdown_rx => {
                        debug!("reaper stopping");
                        break;
                    }
                }
            }
        });

        ReaperHandle {
            shutdown_tx,
            handle,
        }
    }
}

/// Stop control for a spawned [`Reaper`]
pub struct ReaperHandle {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signal the reaper to stop and wait for the task to finish
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

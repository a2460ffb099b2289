//! Periodic health sweeps and their broadcast to stream subscribers

use crate::gateway::Gateway;
use crate::models::HealthSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const CHANNEL_CAPACITY: usize = 16;

/// Fan-out of completed health sweeps
///
/// Subscribers that fall behind skip the snapshots they missed.
#[derive(Clone)]
pub struct HealthBroadcast {
    tx: broadcast::Sender<HealthSnapshot>,
}

impl Default for HealthBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthBroadcast {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HealthSnapshot> {
        self.tx.subscribe()
    }

    /// Returns the number of subscribers that received the snapshot
    pub fn publish(&self, snapshot: HealthSnapshot) -> usize {
        self.tx.send(snapshot).unwrap_or(0)
    }
}

/// Background worker that sweeps every `interval` until `ct` is cancelled
///
/// The first sweep happens one interval after spawning; startup runs its own.
pub fn spawn_health_monitor(
    gateway: Arc<Gateway>,
    interval: Duration,
    ct: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Health monitor started");
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ct.cancelled() => break,
                _ = ticker.tick() => {
                    let sweep = gateway.refresh_health().await;
                    debug!(services = sweep.len(), "Periodic health sweep complete");
                }
            }
        }

        info!("Health monitor stopped");
    })
}

//! Background task that evicts idle sessions on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ConversationManager;

/// Spawn the sweeper. It runs until `shutdown` is cancelled.
pub fn spawn_sweeper(
    manager: Arc<ConversationManager>,
    interval: Duration,
    max_age: chrono::Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            max_age_hours = max_age.num_hours(),
            "session sweeper started"
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("session sweeper stopping");
                    break;
                }

                _ = ticker.tick() => {
                    match manager.cleanup_idle_since(chrono::Utc::now(), max_age) {
                        Ok(0) => {}
                        Ok(removed) => debug!(removed, "sweep finished"),
                        Err(e) => warn!("session sweep failed: {e}"),
                    }
                }
            }
        }
    })
}

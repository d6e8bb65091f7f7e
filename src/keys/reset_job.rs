use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::accountant::UsageAccountant;

/// Spawn the periodic stale-counter reset.
///
/// The first pass runs immediately, so keys left over quota by a previous process come
/// back as soon as their window has elapsed.
pub fn spawn_reset_job(accountant: UsageAccountant, poll_interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match accountant.reset_stale(Utc::now()).await {
                Ok(0) => {}
                Ok(count) => info!(count, "daily key usage reset"),
                Err(e) => warn!(error = %e, "key usage reset pass failed"),
            }
        }
    })
}

use std::time::Duration;

use shared::conversation::SessionStore;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Periodically drops sessions idle for longer than `retention`. The first
/// sweep runs one `interval` after spawning.
pub fn spawn_session_sweeper(
    store: SessionStore,
    interval: Duration,
    retention: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&store, retention);
        }
    })
}

fn sweep_once(store: &SessionStore, retention: Duration) -> usize {
    let removed = store.sweep_expired(retention);
    if removed > 0 {
        info!(
            removed,
            remaining = store.len(),
            "expired conversation sessions swept"
        );
    } else {
        debug!(remaining = store.len(), "no expired conversation sessions");
    }
    removed
}

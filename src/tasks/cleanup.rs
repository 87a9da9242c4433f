//! Cache Cleanup Task
//!
//! Background task that periodically sweeps the cache.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns a background task that sweeps `cache` every `interval`.
///
/// Each pass drops expired entries and evicts the oldest ones while the
/// cache is above its size ceiling. Passes are skipped while
/// `autoCleanup` is turned off, so the setting can be toggled at runtime.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if !cache.settings().await.auto_cleanup {
                debug!("Cache cleanup skipped: auto cleanup disabled");
                continue;
            }

            let report = cache.cleanup().await;
            if report.expired > 0 || report.evicted > 0 {
                info!(
                    "Cache cleanup: {} expired, {} evicted, {} remaining",
                    report.expired, report.evicted, report.remaining
                );
            } else {
                debug!("Cache cleanup: nothing to remove");
            }
        }
    })
}

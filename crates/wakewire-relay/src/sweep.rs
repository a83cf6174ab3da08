//! Retention sweep.
//!
//! Queued messages are reclaimed once they outlive the retention window,
//! whether or not they were ever pulled. Deleting by age cutoff only,
//! never by content, keeps the sweep safe alongside in-flight pull
//! transactions.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wakewire_core::unix_timestamp;

use crate::storage::RelayDatabase;

/// Spawn the periodic sweep task.
///
/// Runs until `shutdown` is cancelled. A failed cycle is logged and the
/// schedule continues; one bad pass must never stop retention.
pub fn spawn_sweeper(
    db: RelayDatabase,
    retention: Duration,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // Skip first immediate tick

        #[allow(clippy::cast_possible_wrap)]
        let retention_secs = retention.as_secs() as i64;

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    info!("Retention sweep stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let cutoff = unix_timestamp() - retention_secs;
                    match db.delete_messages_older_than(cutoff).await {
                        Ok(removed) if removed > 0 => {
                            info!(removed, "Swept stale queued messages");
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "Retention sweep cycle failed");
                        }
                    }
                }
            }
        }
    })
}

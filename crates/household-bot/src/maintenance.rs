//! Background housekeeping.

use std::future::Future;
use std::time::Duration;

use database::{tool_audit, Database};
use tracing::{debug, info, warn};

const PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Prune the tool audit log once by age, then by row count.
pub async fn prune_audit(db: &Database, retention: Duration, max_rows: usize) -> u64 {
    let mut removed = 0;

    match tool_audit::prune_older_than(db.pool(), retention).await {
        Ok(n) => removed += n,
        Err(e) => warn!("Failed to prune old audit entries: {}", e),
    }
    match tool_audit::prune_over_limit(db.pool(), max_rows).await {
        Ok(n) => removed += n,
        Err(e) => warn!("Failed to cap audit log: {}", e),
    }

    if removed > 0 {
        info!("Pruned {} tool audit entries", removed);
    } else {
        debug!("Tool audit log within limits");
    }
    removed
}

/// Prune hourly until shutdown.
pub async fn run_audit_pruner<S>(db: Database, retention: Duration, max_rows: usize, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(PRUNE_INTERVAL);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => return,
            _ = interval.tick() => {
                prune_audit(&db, retention, max_rows).await;
            }
        }
    }
}

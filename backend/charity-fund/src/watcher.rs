//! Long-running task that periodically runs an allocation over the stored
//! open pools, picking up rows written by other processes.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::ledger::Ledger;

/// Run allocations every `interval` until `shutdown` is cancelled.
///
/// Returns the number of runs that moved money.
pub async fn run(ledger: Arc<Ledger>, interval: Duration, shutdown: CancellationToken) -> u64 {
    info!("Allocation watcher starting — every {}s", interval.as_secs());
    let mut productive_runs = 0u64;

    loop {
        match ledger.invest().await {
            Ok(summary) if !summary.is_empty() => {
                productive_runs += 1;
                info!(
                    "Watcher run touched {} projects and {} donations",
                    summary.projects_touched, summary.donations_touched
                );
            }
            Ok(_) => {}
            Err(e) => {
                error!("Allocation run failed: {e}");
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!("Allocation watcher stopped after {productive_runs} productive runs");
    productive_runs
}

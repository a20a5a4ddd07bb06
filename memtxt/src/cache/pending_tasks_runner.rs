use crate::cache::cache::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant as StdInstant};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

/// Periodically gives the store a chance to do its housekeeping
/// (moka eviction and expiration bookkeeping).
pub struct PendingTasksRunner {
    store: Arc<dyn Cache + Send + Sync>,
    cancellation_token: CancellationToken,
}

impl PendingTasksRunner {
    const INTERVAL_IN_MILIS: u64 = 100;

    pub fn new(
        store: Arc<dyn Cache + Send + Sync>,
        cancellation_token: CancellationToken,
    ) -> Self {
        debug!("Creating pending tasks runner");
        PendingTasksRunner {
            store,
            cancellation_token,
        }
    }

    pub async fn run(&self) {
        let start = Instant::now();
        let mut interval = interval_at(
            start,
            Duration::from_millis(PendingTasksRunner::INTERVAL_IN_MILIS),
        );
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let start = StdInstant::now();
                    self.store.run_pending_tasks();
                    let duration = start.elapsed();
                    if duration.as_millis() > (PendingTasksRunner::INTERVAL_IN_MILIS * 2) as u128 {
                        warn!("Server pending tasks finished in: {:?}", duration);
                    } else {
                        trace!("Server pending tasks finished in: {:?}", duration);
                    }
                }
                _ = self.cancellation_token.cancelled() => {
                    debug!("Pending tasks runner stopped");
                    return;
                }
            }
        }
    }
}

//! CDR Poller
//!
//! Periodic background task driving the collector. One cycle runs
//! immediately at startup, then every `interval`. A failed cycle is logged
//! and the next one proceeds unaffected; there is no backoff.

use crate::application::CdrCollector;
use crate::infrastructure::ShutdownController;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Background poll loop.
pub struct CdrPoller {
    collector: CdrCollector,
    interval: Duration,
}

impl CdrPoller {
    /// Create a new poller.
    pub fn new(collector: CdrCollector, interval: Duration) -> Self {
        Self {
            collector,
            interval,
        }
    }

    /// Spawn the poll loop. The task stops when `shutdown` fires.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub fn start(self, shutdown: &ShutdownController) -> JoinHandle<()> {
        let mut rx = shutdown.subscribe();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = self.collector.update().await {
                            tracing::error!("cdr poll cycle failed: {}", e);
                        }
                    }
                    _ = rx.recv() => {
                        tracing::info!("cdr poller stopping");
                        break;
                    }
                }
            }
        })
    }
}

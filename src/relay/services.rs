//! Background service starters: janitor, usage reporter and API server.

use crate::error::Result;
use crate::janitor::Janitor;

use super::MediaRelay;

impl MediaRelay {
    /// Start the midnight janitor
    ///
    /// Returns an already-finished task when `janitor.enabled` is false. The
    /// janitor stops on [`shutdown`](Self::shutdown).
    pub fn spawn_janitor(&self) -> tokio::task::JoinHandle<()> {
        if !self.config.janitor.enabled {
            tracing::info!("Janitor disabled, registry will not be cleared automatically");
            return tokio::spawn(async {});
        }

        let janitor = Janitor::new(
            self.registry.clone(),
            self.event_tx.clone(),
            self.submissions.shutdown.child_token(),
        );

        tracing::info!("Janitor background task started");
        tokio::spawn(janitor.run())
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server keeps running until the task is aborted or the process
    /// exits; use [`crate::run_with_shutdown`] for signal-driven shutdown.
    /// Log registry size and in-flight jobs on the configured interval until shutdown
    pub fn spawn_stats_reporter(&self) -> tokio::task::JoinHandle<()> {
        if !self.config.stats.enabled {
            tracing::info!("Usage reporting disabled");
            return tokio::spawn(async {});
        }

        let relay = self.clone();
        let period = self.config.stats.interval;
        let cancel = self.submissions.shutdown.child_token();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Usage reporter stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        tracing::info!(
                            jobs = relay.registry.len(),
                            in_flight = relay.in_flight(),
                            accepting = relay.is_accepting(),
                            "Usage report"
                        );
                    }
                }
            }
        })
    }

    pub fn spawn_api_server(self: &std::sync::Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let relay = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(relay, config).await })
    }
}

//! Shutdown coordination.

use crate::error::Result;
use crate::types::Event;
use std::sync::atomic::Ordering;

use super::MediaRelay;

impl MediaRelay {
    /// Whether new submissions are accepted
    pub fn is_accepting(&self) -> bool {
        self.submissions.accepting_new.load(Ordering::SeqCst)
    }

    /// Gracefully shut down the relay
    ///
    /// Stops accepting submissions, stops the janitor, and waits up to
    /// `server.shutdown_grace` for running pipelines. Pipelines still running
    /// after the grace period are left to the runtime.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        // 1. Stop accepting new submissions
        self.submissions
            .accepting_new
            .store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new submissions");

        // 2. Stop background services
        self.submissions.shutdown.cancel();

        // 3. Wait for in-flight pipelines with timeout
        self.submissions.in_flight.close();
        let grace = self.config.server.shutdown_grace;
        match tokio::time::timeout(grace, self.submissions.in_flight.wait()).await {
            Ok(()) => tracing::info!("All in-flight jobs completed"),
            Err(_) => tracing::warn!(
                remaining = self.submissions.in_flight.len(),
                grace_secs = grace.as_secs(),
                "Timeout waiting for in-flight jobs, proceeding with shutdown"
            ),
        }

        // 4. Emit shutdown event
        self.emit(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}

//! Daily registry reset
//!
//! Job state is only interesting for the day it was submitted. The janitor
//! sleeps until the next local midnight, clears the registry, and starts
//! over. The wake time is recomputed from the wall clock on every cycle, so
//! clock changes on the host only affect the cycle in progress.
//!
//! # Example
//!
//! ```no_run
//! use media_relay::{Config, MediaRelay};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let relay = MediaRelay::new(Config::default())?;
//! let janitor = relay.spawn_janitor();
//! // ... later, relay.shutdown() stops the janitor
//! # janitor.abort();
//! # Ok(())
//! # }
//! ```

use crate::registry::JobRegistry;
use crate::types::Event;
use chrono::{DateTime, Local, TimeZone};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// First local midnight strictly after `now`
///
/// If midnight does not exist on the next day (a daylight-saving gap), the
/// boundary falls back to 24 hours after `now`.
pub fn next_midnight_after<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    now.date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
        .unwrap_or_else(|| now.clone() + chrono::Duration::days(1))
}

/// Background task clearing the job registry at every local midnight
pub struct Janitor {
    registry: JobRegistry,
    event_tx: broadcast::Sender<Event>,
    cancel: CancellationToken,
}

impl Janitor {
    /// Create a janitor for `registry`; it stops when `cancel` fires
    pub fn new(
        registry: JobRegistry,
        event_tx: broadcast::Sender<Event>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            event_tx,
            cancel,
        }
    }

    /// Run until cancelled
    pub async fn run(self) {
        info!("Janitor started");

        let mut last_boundary: Option<DateTime<Local>> = None;

        loop {
            let now = Local::now();
            let mut boundary = next_midnight_after(&now);
            // A timer that fires a hair early must not clear twice for one midnight
            if last_boundary.as_ref() == Some(&boundary) {
                boundary = next_midnight_after(&boundary);
            }
            let wait = boundary
                .signed_duration_since(now)
                .to_std()
                .unwrap_or(Duration::ZERO);

            debug!(wake_at = %boundary, wait_secs = wait.as_secs(), "Janitor sleeping until next midnight");

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Janitor shutting down");
                    break;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            let removed = self.registry.clear();
            info!(removed, "Cleared job registry at midnight");
            self.event_tx.send(Event::Cleared { removed }).ok();

            last_boundary = Some(boundary);
        }
    }
}

//! Core relay implementation split into focused submodules.
//!
//! The `MediaRelay` struct and its methods are organized by domain:
//! - [`submit`] - Accepting free-text submissions and registering jobs
//! - [`pipeline`] - Fetch, resolve and upload for a single job
//! - [`services`] - Background service starters (janitor, API server)
//! - [`lifecycle`] - Shutdown coordination

mod lifecycle;
mod pipeline;
mod services;
mod submit;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::FetchClient;
use crate::registry::JobRegistry;
use crate::resolver::NamingRules;
use crate::types::{Event, Job, JobId};
use crate::uploader::StorageClient;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Submission gate and in-flight pipeline tracking
#[derive(Clone)]
pub(crate) struct SubmissionState {
    /// Flag to indicate whether new submissions are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Every spawned pipeline, so shutdown can wait for them
    pub(crate) in_flight: TaskTracker,
    /// Cancelled on shutdown; background services stop when it fires
    pub(crate) shutdown: CancellationToken,
}

impl SubmissionState {
    fn new() -> Self {
        Self {
            accepting_new: Arc::new(AtomicBool::new(true)),
            in_flight: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Outbound clients used by the pipeline
#[derive(Clone)]
pub(crate) struct Collaborators {
    /// Media-fetch service client
    pub(crate) fetcher: FetchClient,
    /// Storage backend client
    pub(crate) storage: StorageClient,
    /// How the fetch service names downloaded files
    pub(crate) naming: NamingRules,
}

/// Main relay instance (cloneable - all shared state is Arc-wrapped)
#[derive(Clone)]
pub struct MediaRelay {
    /// Job registry shared with status readers and the janitor
    pub registry: JobRegistry,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Outbound clients
    pub(crate) collaborators: Collaborators,
    /// Submission gate and in-flight tracking
    pub(crate) submissions: SubmissionState,
}

impl MediaRelay {
    /// Create a new MediaRelay instance
    ///
    /// Validates the configuration and builds one HTTP connection pool shared
    /// by the fetch and storage clients. Nothing is spawned until
    /// [`submit`](Self::submit) or one of the service starters is called.
    pub fn new(mut config: Config) -> Result<Self> {
        config.validate()?;
        config.resolve_download_dir()?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("media-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let collaborators = Collaborators {
            fetcher: FetchClient::new(http.clone(), config.fetcher.clone()),
            storage: StorageClient::new(http, config.storage.clone()),
            naming: NamingRules::from(&config.fetcher),
        };

        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            fetcher = %config.fetcher.url,
            storage = %config.storage.url,
            download_dir = %config.fetcher.download_dir.display(),
            "Media relay initialized"
        );

        Ok(Self {
            registry: JobRegistry::new(),
            event_tx,
            config: Arc::new(config),
            collaborators,
            submissions: SubmissionState::new(),
        })
    }

    /// Subscribe to job events
    ///
    /// Each subscriber receives all events independently. A subscriber that
    /// falls more than 1000 events behind receives `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_relay::{Config, MediaRelay};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let relay = MediaRelay::new(Config::default())?;
    ///
    ///     let mut events = relay.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("{}: {:?}", event.kind(), event);
    ///         }
    ///     });
    ///
    ///     relay.submit("look at https://example.com/item/1")?;
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the configuration
    pub fn get_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Every job in the registry, most recent submission first
    pub fn jobs(&self) -> Vec<Job> {
        self.registry.snapshot_descending()
    }

    /// A single job by id
    pub fn job(&self, id: JobId) -> Option<Job> {
        self.registry.get(id)
    }

    /// Number of pipelines still running
    pub fn in_flight(&self) -> usize {
        self.submissions.in_flight.len()
    }

    pub(crate) fn emit(&self, event: Event) {
        // No subscribers is not an error
        self.event_tx.send(event).ok();
    }
}

//! # media-relay
//!
//! Relays social-media posts into remote storage as tracked background jobs.
//!
//! A submission is free text. The first http(s) URL in it becomes a job: the
//! media-fetch service downloads the post into a shared directory, the relay
//! works out which files it produced, and each file is uploaded to the storage
//! backend. Job status is kept in memory and wiped at every local midnight.
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_relay::{Config, MediaRelay};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let relay = MediaRelay::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = relay.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let id = relay.submit("new post https://www.xiaohongshu.com/explore/abc123")?;
//!     println!("job {id} is pending");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// URL extraction from free text
pub mod extractor;
/// Media-fetch service client
pub mod fetcher;
/// Midnight registry reset
pub mod janitor;
/// In-memory job registry
pub mod registry;
/// Pipeline orchestration (decomposed into focused submodules)
pub mod relay;
/// Mapping fetch results to files on disk
pub mod resolver;
/// Core types and events
pub mod types;
/// Storage backend upload dispatch
pub mod uploader;

// Re-export commonly used types
pub use config::Config;
pub use error::{
    ApiError, Error, ErrorDetail, FetchError, ResolutionError, Result, ToHttpStatus, UploadError,
};
pub use registry::JobRegistry;
pub use relay::MediaRelay;
pub use types::{Event, FetchResult, Job, JobId, JobStatus, MediaKind, Resource};

/// Helper function to run the relay's API server with graceful signal handling.
///
/// Serves the REST API until a termination signal arrives, then stops
/// accepting connections and calls the relay's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_relay::{Config, MediaRelay, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let relay = Arc::new(MediaRelay::new(Config::default())?);
///     relay.spawn_janitor();
///
///     // Run with automatic signal handling
///     run_with_shutdown(relay).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(relay: std::sync::Arc<MediaRelay>) -> Result<()> {
    let config = relay.get_config();
    let served = api::serve_with_shutdown(relay.clone(), config, wait_for_signal()).await;

    // Drain in-flight jobs even when the server failed to start
    relay.shutdown().await?;
    served
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}

//! Application state for the API server

use crate::{Config, MediaRelay};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The relay handling submissions and holding the job registry
    pub relay: Arc<MediaRelay>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(relay: Arc<MediaRelay>, config: Arc<Config>) -> Self {
        Self { relay, config }
    }
}

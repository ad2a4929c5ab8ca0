//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] - Submission and status queries
//! - [`system`] - Health, events, OpenAPI

use crate::types::JobId;
use serde::{Deserialize, Serialize};

mod jobs;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use jobs::*;
pub use system::*;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of POST /api/process
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmitRequest {
    /// The forwarded message
    pub message: SubmitMessage,
}

/// Message wrapper carrying the free text
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmitMessage {
    /// Free text; the first http(s) URL in it is processed
    pub text: String,
}

/// Acknowledgment returned by POST /api/process
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    /// Always "submitted"
    pub message: String,
    /// Always true
    pub success: bool,
    /// Id of the registered job
    pub job_id: JobId,
}

impl SubmitResponse {
    /// Acknowledgment for a registered job
    pub fn submitted(job_id: JobId) -> Self {
        Self {
            message: "submitted".to_string(),
            success: true,
            job_id,
        }
    }
}

//! Error types for media-relay
//!
//! This module provides:
//! - The crate-wide [`Error`] and [`Result`] alias
//! - Stage errors for the pipeline ([`FetchError`], [`ResolutionError`], [`UploadError`])
//! - HTTP status code mapping and the JSON error body used by the API

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetcher.url")
        key: Option<String>,
    },

    /// Submitted text contained no http(s) URL
    #[error("no http or https URL found in submitted text")]
    InputRejected,

    /// Request body was missing, not JSON, or not shaped like a submission
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Relay is shutting down and no longer accepts submissions
    #[error("shutdown in progress: not accepting new submissions")]
    ShuttingDown,

    /// Fetch service call failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Fetched media could not be resolved into files
    #[error("resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Upload to the storage backend failed
    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Errors from the outbound call to the media-fetch service
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or timed out
    #[error("fetch service request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Service answered with a non-200 status
    #[error("fetch service returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response body was not the expected JSON
    #[error("fetch service response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Errors while turning a fetch result into on-disk resources
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Download directory could not be listed
    #[error("cannot read download directory {dir}: {source}")]
    DirectoryUnreadable {
        /// Directory that was scanned
        dir: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No downloaded file carries the item id
    #[error("no file matching item {item_id} in {dir}")]
    NoMatchingFile {
        /// Directory that was scanned
        dir: PathBuf,
        /// Item id that was searched for
        item_id: String,
    },
}

/// Errors for a single resource upload
#[derive(Debug, Error)]
pub enum UploadError {
    /// Local file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Request could not be sent or timed out
    #[error("upload request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Backend answered with a non-success HTTP status
    #[error("storage backend returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Response body was not the expected JSON
    #[error("storage backend response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    /// Backend reported a failure code in its JSON body
    #[error("storage backend rejected upload (code {code}): {message}")]
    Rejected {
        /// Backend result code
        code: i64,
        /// Backend message
        message: String,
    },
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "input_rejected",
///     "message": "no http or https URL found in submitted text"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "input_rejected")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::InputRejected => 400,
            Error::InvalidBody(_) => 400,

            // 422 Unprocessable Entity - media present but unusable
            Error::Resolution(_) => 422,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // 502 Bad Gateway - External service errors
            Error::Fetch(_) => 502,
            Error::Upload(_) => 502,
            Error::Network(_) => 502,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InputRejected => "input_rejected",
            Error::InvalidBody(_) => "invalid_body",
            Error::ShuttingDown => "shutting_down",
            Error::Fetch(e) => match e {
                FetchError::Transport(_) => "fetch_unreachable",
                FetchError::Status { .. } => "fetch_status",
                FetchError::Decode(_) => "fetch_decode",
            },
            Error::Resolution(e) => match e {
                ResolutionError::DirectoryUnreadable { .. } => "directory_unreadable",
                ResolutionError::NoMatchingFile { .. } => "no_matching_file",
            },
            Error::Upload(e) => match e {
                UploadError::Read { .. } => "upload_read",
                UploadError::Transport(_) => "upload_unreachable",
                UploadError::Status { .. } => "upload_status",
                UploadError::Decode(_) => "upload_decode",
                UploadError::Rejected { .. } => "upload_rejected",
            },
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Fetch(FetchError::Status { status })
            | Error::Upload(UploadError::Status { status }) => Some(serde_json::json!({
                "upstream_status": status,
            })),
            Error::Resolution(ResolutionError::NoMatchingFile { dir, item_id }) => {
                Some(serde_json::json!({
                    "dir": dir,
                    "item_id": item_id,
                }))
            }
            Error::Upload(UploadError::Rejected { code, .. }) => Some(serde_json::json!({
                "backend_code": code,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

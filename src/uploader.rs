//! Upload dispatch to the storage backend
//!
//! Each resource is sent as its own `PUT` with the raw file bytes as the body
//! and the destination carried in headers. Resources are uploaded one after
//! another; a failing resource is recorded and the batch moves on.

use crate::config::StorageConfig;
use crate::error::UploadError;
use crate::types::{Resource, UploadOutcome, UploadReport};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use serde::Deserialize;

/// Header carrying the destination path on the backend
pub const FILE_PATH_HEADER: &str = "File-Path";

/// Header asking the backend to store the file as a background task
pub const AS_TASK_HEADER: &str = "As-Task";

/// Result code the backend uses for success
const BACKEND_OK: i64 = 200;

#[derive(Debug, Deserialize)]
struct PutResponse {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<PutData>,
}

#[derive(Debug, Deserialize)]
struct PutData {
    #[serde(default)]
    task: Option<PutTask>,
}

#[derive(Debug, Deserialize)]
struct PutTask {
    #[serde(default)]
    id: String,
}

/// Uploads resources to the storage backend
#[derive(Clone, Debug)]
pub struct StorageClient {
    client: reqwest::Client,
    config: StorageConfig,
}

impl StorageClient {
    /// Create a client sharing the given connection pool
    pub fn new(client: reqwest::Client, config: StorageConfig) -> Self {
        Self { client, config }
    }

    /// Destination path for a file name: upload prefix + percent-encoded name
    pub fn destination(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.config.upload_path.trim_end_matches('/'),
            urlencoding::encode(file_name)
        )
    }

    /// Upload every resource in order and aggregate the outcomes
    pub async fn upload_all(&self, resources: &[Resource]) -> UploadReport {
        let mut outcomes = Vec::with_capacity(resources.len());

        for resource in resources {
            let outcome = match self.upload(resource).await {
                Ok(task_id) => {
                    tracing::debug!(file = %resource.file_name, task_id = ?task_id, "resource uploaded");
                    UploadOutcome::succeeded(task_id)
                }
                Err(e) => {
                    tracing::warn!(file = %resource.file_name, error = %e, "resource upload failed");
                    UploadOutcome::failed(e)
                }
            };
            outcomes.push(outcome);
        }

        UploadReport::new(outcomes)
    }

    /// Upload a single resource, returning the backend's task id if it queued one
    pub async fn upload(&self, resource: &Resource) -> Result<Option<String>, UploadError> {
        let bytes = tokio::fs::read(&resource.file_path)
            .await
            .map_err(|source| UploadError::Read {
                path: resource.file_path.clone(),
                source,
            })?;
        let length = bytes.len();

        let response = self
            .client
            .put(&self.config.url)
            .header(AUTHORIZATION, &self.config.token)
            .header(FILE_PATH_HEADER, self.destination(&resource.file_name))
            .header(AS_TASK_HEADER, self.config.as_task.to_string())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, length)
            .body(bytes)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(UploadError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
            });
        }

        let body: PutResponse = response.json().await.map_err(UploadError::Decode)?;
        if body.code != BACKEND_OK {
            return Err(UploadError::Rejected {
                code: body.code,
                message: body.message,
            });
        }

        Ok(body
            .data
            .and_then(|d| d.task)
            .map(|t| t.id)
            .filter(|id| !id.is_empty()))
    }
}

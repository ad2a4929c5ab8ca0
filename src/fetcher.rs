//! Client for the media-fetch service
//!
//! The service downloads a post's media into the shared download directory
//! and answers with the post metadata the resolver needs.

use crate::config::FetcherConfig;
use crate::error::FetchError;
use crate::types::{FetchRequest, FetchResponse, FetchResult};
use reqwest::StatusCode;

/// Calls the media-fetch service
#[derive(Clone, Debug)]
pub struct FetchClient {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl FetchClient {
    /// Create a client sharing the given connection pool
    pub fn new(client: reqwest::Client, config: FetcherConfig) -> Self {
        Self { client, config }
    }

    /// Ask the service to download `url` and return the post metadata
    ///
    /// Anything but a 200 response is a failure; the body is not inspected
    /// in that case.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let body = FetchRequest {
            url,
            download: true,
            skip: self.config.skip,
        };

        tracing::debug!(endpoint = %self.config.url, url, "requesting media fetch");

        let response = self
            .client
            .post(&self.config.url)
            .json(&body)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let envelope: FetchResponse = response.json().await.map_err(FetchError::Decode)?;
        tracing::debug!(
            message = %envelope.message,
            item_id = %envelope.data.item_id,
            links = envelope.data.download_links.len(),
            "media fetch completed"
        );
        Ok(envelope.data)
    }
}

//! Waiting on job outcomes

use media_relay::{Event, JobId, MediaRelay};
use std::time::Duration;
use tokio::sync::broadcast;

/// Result of waiting for a job to finish
#[derive(Debug, PartialEq)]
pub enum WaitResult {
    /// Job succeeded with the given label
    Succeeded(String),
    /// Job failed with the given label and reason
    Failed { label: String, error: String },
    /// Timeout waiting for completion
    Timeout,
    /// Channel closed unexpectedly
    ChannelClosed,
}

/// Wait for job `id` to emit its terminal event
///
/// `events` must be subscribed before the job is submitted, otherwise a fast
/// pipeline can finish before the receiver exists.
pub async fn wait_for_outcome(
    events: &mut broadcast::Receiver<Event>,
    id: JobId,
    timeout: Duration,
) -> WaitResult {
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::Succeeded { id: event_id, label, .. }) if event_id == id => {
                    return WaitResult::Succeeded(label);
                }
                Ok(Event::Failed {
                    id: event_id,
                    label,
                    error,
                }) if event_id == id => {
                    return WaitResult::Failed { label, error };
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    result.unwrap_or(WaitResult::Timeout)
}

/// Submit `text` and wait for the job's terminal event
pub async fn submit_and_wait(relay: &MediaRelay, text: &str) -> (JobId, WaitResult) {
    let mut events = relay.subscribe();
    let id = relay.submit(text).expect("submission should be accepted");
    let outcome = wait_for_outcome(&mut events, id, Duration::from_secs(10)).await;
    (id, outcome)
}

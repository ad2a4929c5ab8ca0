//! Submission of free-text messages

use crate::error::{Error, Result};
use crate::extractor::extract_url;
use crate::types::{Event, Job, JobId};
use std::sync::atomic::Ordering;

use super::MediaRelay;

impl MediaRelay {
    /// Register a job for the first URL in `text` and start its pipeline
    ///
    /// Returns as soon as the job is recorded as pending; fetching and
    /// uploading continue in the background. Text without an http(s) URL is
    /// rejected and nothing is registered.
    ///
    /// # Errors
    ///
    /// * [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) has begun
    /// * [`Error::InputRejected`] if `text` contains no URL
    pub fn submit(&self, text: &str) -> Result<JobId> {
        if !self.submissions.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let url = extract_url(text).ok_or(Error::InputRejected)?;

        let job = Job::pending(JobId::now(), url);
        let id = job.id;
        self.registry.put(job.clone());

        tracing::info!(job_id = %id, url, "Job submitted");
        self.emit(Event::Submitted {
            id,
            url: url.to_string(),
        });

        let relay = self.clone();
        self.submissions.in_flight.spawn(async move {
            relay.run_pipeline(job).await;
        });

        Ok(id)
    }
}

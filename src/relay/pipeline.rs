//! Per-job pipeline: fetch, resolve, upload.
//!
//! The steps run strictly in order. Whatever happens, the pipeline ends with
//! exactly one terminal `put` into the registry and one terminal event.

use crate::error::Error;
use crate::resolver::resolve_resources;
use crate::types::{Event, Job, JobStatus, UploadReport};

use super::MediaRelay;

/// Terminal state produced by a pipeline run
struct Finished {
    job: Job,
    uploaded: usize,
}

impl Finished {
    fn failed(job: Job) -> Self {
        Self { job, uploaded: 0 }
    }
}

impl MediaRelay {
    /// Drive `job` to a terminal status and record it
    pub(crate) async fn run_pipeline(&self, job: Job) {
        let Finished { job, uploaded } = self.process(&job).await;

        let event = match job.status {
            JobStatus::Succeeded => {
                tracing::info!(job_id = %job.id, label = %job.label, resources = uploaded, "Job succeeded");
                Event::Succeeded {
                    id: job.id,
                    label: job.label.clone(),
                    resources: uploaded,
                }
            }
            _ => {
                let error = job.error.clone().unwrap_or_default();
                tracing::warn!(job_id = %job.id, label = %job.label, error = %error, "Job failed");
                Event::Failed {
                    id: job.id,
                    label: job.label.clone(),
                    error,
                }
            }
        };

        // Subscribers reacting to the event must already see the terminal job
        self.registry.put(job);
        self.emit(event);
    }

    async fn process(&self, job: &Job) -> Finished {
        let fetched = match self.collaborators.fetcher.fetch(&job.url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                return Finished::failed(job.failed(job.url.clone(), Error::from(e).to_string()));
            }
        };

        tracing::debug!(
            job_id = %job.id,
            item_id = %fetched.item_id,
            kind = fetched.kind.tag(),
            "Media fetched"
        );

        let resources = match resolve_resources(
            &self.config.fetcher.download_dir,
            &fetched,
            &self.collaborators.naming,
        )
        .await
        {
            Ok(resources) => resources,
            Err(e) => {
                return Finished::failed(job.failed(job.url.clone(), Error::from(e).to_string()));
            }
        };

        tracing::debug!(job_id = %job.id, resources = resources.len(), "Resources resolved");

        let report = self.collaborators.storage.upload_all(&resources).await;
        let label = fetched.label();

        if report.all_succeeded {
            Finished {
                job: job.succeeded(label),
                uploaded: report.outcomes.len(),
            }
        } else {
            Finished::failed(job.failed(label, describe_failures(&report)))
        }
    }
}

/// Summary of a partially failed upload batch
fn describe_failures(report: &UploadReport) -> String {
    format!(
        "upload failed: {} of {} resources: {}",
        report.failed_count(),
        report.outcomes.len(),
        report.first_error().unwrap_or("unknown error")
    )
}

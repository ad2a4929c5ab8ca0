//! In-memory job registry
//!
//! The registry is the only state shared between submission handlers, the
//! per-job pipelines, status readers and the janitor. Entries are `Arc<Job>`
//! values replaced whole, so a reader either sees the previous job or the
//! new one, never a mix.

use crate::types::{Job, JobId};
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrency-safe map from job id to job
///
/// Cloning is cheap and every clone refers to the same map.
#[derive(Clone, Debug, Default)]
pub struct JobRegistry {
    jobs: Arc<DashMap<JobId, Arc<Job>>>,
}

impl JobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the job stored under `job.id`
    ///
    /// The last write for an id wins, which is also how two submissions in
    /// the same second resolve.
    pub fn put(&self, job: Job) {
        self.jobs.insert(job.id, Arc::new(job));
    }

    /// Current job for `id`
    pub fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.get(&id).map(|entry| entry.value().as_ref().clone())
    }

    /// All jobs, most recent submission first
    ///
    /// Only one shard is locked at a time while collecting, and sorting
    /// happens after every lock is released.
    pub fn snapshot_descending(&self) -> Vec<Job> {
        let mut jobs: Vec<Arc<Job>> = self
            .jobs
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        jobs.sort_unstable_by(|a, b| b.id.cmp(&a.id));
        jobs.into_iter().map(|job| job.as_ref().clone()).collect()
    }

    /// Remove every job, returning how many were removed
    pub fn clear(&self) -> usize {
        let ids: Vec<JobId> = self.jobs.iter().map(|entry| *entry.key()).collect();
        ids.into_iter()
            .filter(|id| self.jobs.remove(id).is_some())
            .count()
    }

    /// Number of jobs
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the registry holds no jobs
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

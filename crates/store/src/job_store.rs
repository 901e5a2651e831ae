//! In-memory registry of job id → current lifecycle record.

use std::collections::HashMap;
use std::sync::RwLock;

use renderdeck_core::{Job, JobId, JobUpdate};

/// Single source of truth for job state visible to external queriers.
///
/// Records are inserted at submit time and mutated only by the
/// scheduler and invoker while the job executes. Nothing is ever
/// removed, so the map grows for the lifetime of the process. The
/// lock is never held across await points.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly submitted job.
    pub fn insert(&self, job: Job) {
        self.jobs
            .write()
            .expect("job store lock poisoned")
            .insert(job.id.clone(), job);
    }

    /// Current snapshot of a job, if registered.
    pub fn get(&self, id: &str) -> Option<Job> {
        self.jobs
            .read()
            .expect("job store lock poisoned")
            .get(id)
            .cloned()
    }

    /// Merge partial fields into the job's record and refresh
    /// `last_updated`. Unknown ids are ignored; no history is kept
    /// beyond the current snapshot.
    pub fn update(&self, id: &str, update: JobUpdate) {
        let mut jobs = self.jobs.write().expect("job store lock poisoned");
        let Some(job) = jobs.get_mut(id) else {
            return;
        };

        if let Some(status) = update.status {
            job.status = status;
        }
        if let Some(phase) = update.phase {
            job.phase = phase;
        }
        if let Some(progress) = update.progress {
            job.progress = progress;
        }
        if let Some(output) = update.output {
            job.output = Some(output);
        }
        if let Some(error) = update.error {
            job.error = Some(error);
        }
        if let Some(rendered) = update.rendered_frames {
            job.rendered_frames = Some(rendered);
        }
        if let Some(total) = update.total_frames {
            job.total_frames = Some(total);
        }
        if let Some(completed_at) = update.completed_at {
            job.completed_at = Some(completed_at);
        }
        job.last_updated = chrono::Utc::now();
    }

    /// Number of registered jobs (all lifecycles).
    pub fn len(&self) -> usize {
        self.jobs.read().expect("job store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use renderdeck_core::{JobStatus, JobPhase};

    use super::*;

    #[test]
    fn inserted_job_is_immediately_queryable() {
        let store = JobStore::new();
        store.insert(Job::queued("j1".into()));

        let job = store.get("j1").expect("job must exist after insert");
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
    }

    #[test]
    fn update_merges_only_provided_fields() {
        let store = JobStore::new();
        store.insert(Job::queued("j1".into()));

        store.update(
            "j1",
            JobUpdate {
                status: Some(JobStatus::Rendering),
                phase: Some(JobPhase::Rendering),
                progress: Some(40),
                rendered_frames: Some(80),
                total_frames: Some(200),
                ..Default::default()
            },
        );

        let job = store.get("j1").unwrap();
        assert_eq!(job.status, JobStatus::Rendering);
        assert_eq!(job.progress, 40);
        assert_eq!(job.rendered_frames, Some(80));
        // Untouched fields survive the merge.
        assert!(job.error.is_none());
        assert!(job.output.is_none());
        assert!(job.last_updated >= job.created_at);
    }

    #[test]
    fn update_of_unknown_id_is_a_noop() {
        let store = JobStore::new();
        store.update("ghost", JobUpdate::default());
        assert!(store.is_empty());
    }
}

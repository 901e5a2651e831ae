//! The orchestrator facade: submission, status, and catalog queries.

use std::sync::Arc;

use renderdeck_core::types::new_job_id;
use renderdeck_core::{CoreError, Job, JobId, RenderRecord, SubmitRender};
use renderdeck_engine::bundle::BundleCache;
use renderdeck_engine::RenderEngine;
use renderdeck_store::{JobStore, MetadataStore, StoreError};
use serde::Serialize;

use crate::config::OrchestratorConfig;
use crate::scheduler::{QueueEntry, Scheduler};

/// Job record plus queue context, as returned to status queriers.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusView {
    #[serde(flatten)]
    pub job: Job,
    /// 1-based position in the pending queue; 0 once running or done.
    pub queue_position: usize,
    pub pending: usize,
    pub active: usize,
    pub concurrency: usize,
}

/// Result of a catalog delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Coordinates render jobs against the external engine.
///
/// Owns the job registry, the FIFO scheduler, the bundle cache, and
/// the completed-render catalog. Construct one per deployment (or per
/// test) with [`RenderOrchestrator::new`] and share it via `Arc`.
pub struct RenderOrchestrator {
    pub(crate) config: OrchestratorConfig,
    pub(crate) jobs: JobStore,
    pub(crate) scheduler: Scheduler,
    pub(crate) metadata: MetadataStore,
    pub(crate) bundle: BundleCache,
    pub(crate) engine: Arc<dyn RenderEngine>,
}

impl RenderOrchestrator {
    pub fn new(config: OrchestratorConfig, engine: Arc<dyn RenderEngine>) -> Arc<Self> {
        let scheduler = Scheduler::new(config.concurrency);
        let metadata = MetadataStore::new(&config.output_dir);
        let bundle = BundleCache::new(&config.entry_point);

        Arc::new(Self {
            config,
            jobs: JobStore::new(),
            scheduler,
            metadata,
            bundle,
            engine,
        })
    }

    /// Register a render request and attempt immediate dispatch.
    ///
    /// The job is queryable via [`status`](Self::status) the moment
    /// this returns, even if it is still waiting for a worker slot.
    pub async fn submit(self: &Arc<Self>, input: SubmitRender) -> Result<JobId, CoreError> {
        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "cannot create output directory {}: {e}",
                    self.config.output_dir.display()
                ))
            })?;

        let job_id = new_job_id();
        self.jobs.insert(Job::queued(job_id.clone()));
        self.scheduler.enqueue(QueueEntry {
            job_id: job_id.clone(),
            input,
        });

        tracing::info!(job_id = %job_id, "Render job submitted");
        self.dispatch();
        Ok(job_id)
    }

    /// Start workers for every claimable queue entry.
    fn dispatch(self: &Arc<Self>) {
        while let Some(entry) = self.scheduler.claim_next() {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.run_worker(entry).await });
        }
    }

    /// Run one job, then keep pulling from the queue until no entry is
    /// claimable. Slot release and the next claim are a single atomic
    /// step, so every completion pulls the next waiting job and the
    /// active count never exceeds the limit.
    async fn run_worker(self: Arc<Self>, mut entry: QueueEntry) {
        loop {
            self.execute_job(&entry).await;
            match self.scheduler.release_and_claim() {
                Some(next) => entry = next,
                None => return,
            }
        }
    }

    /// Job record plus queue context.
    ///
    /// A job id that was just handed out by [`submit`](Self::submit)
    /// but is not yet registered (a narrow race) gets a synthesized
    /// queued placeholder instead of a not-found, so callers never see
    /// an id they were just given disappear.
    pub fn status(&self, job_id: &str) -> JobStatusView {
        let job = self
            .jobs
            .get(job_id)
            .unwrap_or_else(|| Job::queued(job_id.to_string()));
        let view = self.scheduler.queue_view();

        JobStatusView {
            queue_position: self.scheduler.position_of(job_id),
            pending: view.pending,
            active: view.active,
            concurrency: view.concurrency,
            job,
        }
    }

    /// Completed renders for a project, newest first.
    pub async fn list_renders(&self, project_id: &str) -> Result<Vec<RenderRecord>, StoreError> {
        self.metadata.list_by_project(project_id).await
    }

    /// Look up one completed render.
    pub async fn find_render(&self, id: &str) -> Result<Option<RenderRecord>, StoreError> {
        self.metadata.find_by_id(id).await
    }

    /// Delete a completed render from the catalog, best-effort
    /// unlinking its output file.
    pub async fn delete_render(&self, id: &str) -> Result<DeleteOutcome, StoreError> {
        match self.metadata.delete_by_id(id).await? {
            Some(record) => {
                tracing::info!(record_id = %record.id, "Render deleted from catalog");
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    /// Whether the catalog file is readable (health checks).
    pub async fn catalog_healthy(&self) -> bool {
        self.metadata.load().await.is_ok()
    }
}

//! Per-job execution against the external engine.
//!
//! Drives exactly one job to a terminal state. Every failure (bundle
//! build, composition lookup, engine invocation, output inspection)
//! is caught here and recorded on the job; nothing propagates into the
//! scheduler's dispatch loop. There is no cancellation of an in-flight
//! job and no timeout on the engine call: a stalled engine stalls its
//! worker slot until the engine returns.

use std::path::PathBuf;

use renderdeck_core::naming::output_filename;
use renderdeck_core::{JobPhase, JobStatus, JobUpdate, RenderRecord};
use renderdeck_engine::{EngineError, RenderRequest};
use tokio::sync::mpsc;

use crate::orchestrator::RenderOrchestrator;
use crate::scheduler::QueueEntry;

/// Progress events buffered between the engine and the job store.
const PROGRESS_CHANNEL_CAPACITY: usize = 32;

/// Reasons a single job fails. Fatal to that job only.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Composition not found: {0}")]
    CompositionNotFound(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Output file inspection failed: {0}")]
    Output(#[source] std::io::Error),
}

impl RenderOrchestrator {
    /// Execute one claimed job to a terminal state.
    pub(crate) async fn execute_job(&self, entry: &QueueEntry) {
        let job_id = entry.job_id.as_str();
        tracing::info!(job_id, project_id = %entry.input.project_id, "Render job started");

        self.jobs.update(
            job_id,
            JobUpdate {
                status: Some(JobStatus::Preparing),
                phase: Some(JobPhase::Bundling),
                ..Default::default()
            },
        );

        match self.render_one(entry).await {
            Ok(output) => {
                self.jobs.update(
                    job_id,
                    JobUpdate {
                        status: Some(JobStatus::Completed),
                        phase: Some(JobPhase::Completed),
                        progress: Some(100),
                        output: Some(output),
                        completed_at: Some(chrono::Utc::now()),
                        ..Default::default()
                    },
                );
                tracing::info!(job_id, "Render job completed");
            }
            Err(e) => {
                // The message is captured verbatim; the caller reads it
                // back from the job record. No automatic retry.
                self.jobs.update(
                    job_id,
                    JobUpdate {
                        status: Some(JobStatus::Failed),
                        phase: Some(JobPhase::Failed),
                        error: Some(e.to_string()),
                        completed_at: Some(chrono::Utc::now()),
                        ..Default::default()
                    },
                );
                tracing::warn!(job_id, error = %e, "Render job failed");
            }
        }
    }

    /// The fallible middle of a job: bundle, compositions, render,
    /// stat, catalog. Returns the output path on success.
    async fn render_one(&self, entry: &QueueEntry) -> Result<PathBuf, JobError> {
        let job_id = entry.job_id.as_str();

        let bundle = self.bundle.ensure(self.engine.as_ref()).await?;

        let compositions = self
            .engine
            .list_compositions(&bundle, Some(&entry.input.input_props))
            .await?;
        let composition = compositions
            .into_iter()
            .find(|c| c.id == self.config.composition_id)
            .ok_or_else(|| JobError::CompositionNotFound(self.config.composition_id.clone()))?;

        let format = entry.input.format;
        let filename = output_filename(entry.input.file_name.as_deref(), format, job_id);
        let output_path = self.config.output_dir.join(&filename);

        self.jobs.update(
            job_id,
            JobUpdate {
                status: Some(JobStatus::Rendering),
                phase: Some(JobPhase::Rendering),
                total_frames: Some(composition.duration_in_frames),
                ..Default::default()
            },
        );

        // The engine owns the sender and drops it when the render
        // finishes, which ends the pump's stream.
        let (progress_tx, mut progress_rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);

        let render = self.engine.render(
            RenderRequest {
                composition: &composition,
                bundle: &bundle,
                codec: format.codec(),
                input_props: &entry.input.input_props,
                output_path: &output_path,
            },
            progress_tx,
        );

        let pump = async {
            while let Some(event) = progress_rx.recv().await {
                self.jobs.update(
                    job_id,
                    JobUpdate {
                        status: Some(JobStatus::Rendering),
                        phase: Some(JobPhase::Rendering),
                        progress: Some(event.percent()),
                        rendered_frames: event.rendered_frames,
                        total_frames: event.total_frames,
                        ..Default::default()
                    },
                );
            }
        };

        let (render_result, ()) = tokio::join!(render, pump);
        render_result?;

        let size = tokio::fs::metadata(&output_path)
            .await
            .map_err(JobError::Output)?
            .len();

        let record = RenderRecord {
            id: entry.job_id.clone(),
            project_id: entry.input.project_id.clone(),
            project_name: entry.input.project_name.clone(),
            filename: filename.clone(),
            path: output_path.clone(),
            size,
            format,
            codec: format.codec().to_string(),
            created_at: chrono::Utc::now(),
            public_url: format!("{}{}", self.config.public_url_prefix, filename),
        };

        // A catalog write failure after a successful render does not
        // fail the job: the output file exists, only the catalog entry
        // is missing.
        if let Err(e) = self.metadata.append(record).await {
            tracing::warn!(job_id, error = %e, "Completed render could not be cataloged");
        }

        Ok(output_path)
    }
}

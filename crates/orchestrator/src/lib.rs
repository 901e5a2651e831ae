//! Render job orchestration.
//!
//! [`RenderOrchestrator`] is the single entry point the API layer talks
//! to: it registers submitted jobs, runs them under a bounded
//! concurrency limit in strict submission order, tracks lifecycle and
//! progress in the job store, and appends completed renders to the
//! durable catalog. One instance is constructed explicitly at startup
//! and shared via `Arc`; there is no module-level singleton.

pub mod config;
mod invoker;
mod scheduler;

mod orchestrator;

pub use config::OrchestratorConfig;
pub use invoker::JobError;
pub use orchestrator::{DeleteOutcome, JobStatusView, RenderOrchestrator};

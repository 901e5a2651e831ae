//! Shared domain types for the render orchestration backend.
//!
//! This crate is I/O-free: job lifecycle records, the completed-render
//! catalog entry, export formats, output filename derivation, and the
//! domain error vocabulary used at the API boundary.

pub mod error;
pub mod format;
pub mod job;
pub mod naming;
pub mod record;
pub mod types;

pub use error::CoreError;
pub use format::ExportFormat;
pub use job::{Job, JobPhase, JobStatus, JobUpdate, SubmitRender};
pub use record::RenderRecord;
pub use types::{JobId, Timestamp};

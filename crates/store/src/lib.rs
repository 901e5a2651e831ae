//! State stores for the render orchestrator.
//!
//! [`JobStore`] is the in-memory source of truth for job status
//! queries; [`MetadataStore`] is the durable, file-backed catalog of
//! completed renders.

pub mod job_store;
pub mod metadata_store;

pub use job_store::JobStore;
pub use metadata_store::{MetadataStore, StoreError};

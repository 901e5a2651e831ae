//! Job lifecycle model and the submit DTO.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::format::ExportFormat;
use crate::types::{JobId, Timestamp};

/// Coarse job lifecycle status.
///
/// Transitions are monotonic: `Queued → Preparing → Rendering →
/// {Completed, Failed}`. No other edge is ever taken; `rank` exists so
/// callers (and tests) can assert that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Preparing,
    Rendering,
    Completed,
    Failed,
}

impl JobStatus {
    /// Position of this status along the lifecycle. Terminal states
    /// share the highest rank.
    pub fn rank(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Preparing => 1,
            Self::Rendering => 2,
            Self::Completed | Self::Failed => 3,
        }
    }

    /// Whether the job has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Finer-grained execution phase surfaced to the editor UI.
///
/// Mirrors [`JobStatus`] but distinguishes the bundle-build step from
/// the queued wait, which the status machine folds into `Preparing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Queued,
    Bundling,
    Rendering,
    Completed,
    Failed,
}

/// One render request's lifecycle state.
///
/// Owned and mutated exclusively by the job store; written only by the
/// scheduler and invoker while the job executes. Records are never
/// deleted during the process lifetime, so the registry grows for as
/// long as the process runs.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub phase: JobPhase,
    /// Render progress, 0–100.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_frames: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<u64>,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl Job {
    /// A freshly submitted job, queued and untouched.
    pub fn queued(id: JobId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            status: JobStatus::Queued,
            phase: JobPhase::Queued,
            progress: 0,
            output: None,
            error: None,
            rendered_frames: None,
            total_frames: None,
            created_at: now,
            last_updated: now,
            completed_at: None,
        }
    }
}

/// Partial update merged into a [`Job`] by the store.
///
/// `None` fields are left untouched; `last_updated` is refreshed on
/// every merge. No history is retained beyond the current snapshot.
#[derive(Debug, Default, Clone)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub phase: Option<JobPhase>,
    pub progress: Option<u8>,
    pub output: Option<PathBuf>,
    pub error: Option<String>,
    pub rendered_frames: Option<u64>,
    pub total_frames: Option<u64>,
    pub completed_at: Option<Timestamp>,
}

/// Payload for submitting a render request.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRender {
    pub project_id: String,
    #[serde(default)]
    pub project_name: Option<String>,
    /// Optional base name for the output file; sanitized before use.
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_format")]
    pub format: ExportFormat,
    /// Opaque timeline/input payload forwarded to the engine.
    #[serde(default)]
    pub input_props: serde_json::Value,
}

/// Accepts any string (or null) as a format, falling back to MP4.
///
/// Stale clients may send formats this build does not know; rejecting
/// the whole submission over the container choice is worse than
/// rendering MP4.
fn lenient_format<'de, D>(deserializer: D) -> Result<ExportFormat, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| ExportFormat::parse(&s)).unwrap_or_default())
}

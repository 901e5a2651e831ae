//! Persisted catalog entry for a completed render.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::format::ExportFormat;
use crate::types::Timestamp;

/// A completed render as stored in the on-disk catalog.
///
/// Created exactly once, at job completion; removed only by an explicit
/// delete, which also best-effort unlinks the output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRecord {
    /// Same value as the job id that produced this render.
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub project_name: Option<String>,
    pub filename: String,
    pub path: PathBuf,
    /// Output file size in bytes, as observed at completion time.
    pub size: u64,
    pub format: ExportFormat,
    pub codec: String,
    pub created_at: Timestamp,
    pub public_url: String,
}

//! Durable catalog of completed renders.
//!
//! One JSON-array file per output directory; every mutation is a full
//! read-modify-write. Within this process, writes are serialized by an
//! internal mutex so concurrent job completions cannot interleave.
//! Across processes the read-modify-write cycle is optimistic: there
//! is no file locking, so two writer processes can lose updates. The
//! catalog assumes a single-process, low-write deployment.

use std::path::{Path, PathBuf};

use renderdeck_core::RenderRecord;
use thiserror::Error;
use tokio::sync::Mutex;

/// Catalog filename inside the output directory.
const CATALOG_FILE: &str = "renders.json";

/// Errors from the catalog file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed, queryable catalog of completed renders.
pub struct MetadataStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MetadataStore {
    /// Catalog for the given output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            path: output_dir.as_ref().join(CATALOG_FILE),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing catalog file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full catalog. A missing file is an empty catalog, so a
    /// fresh output directory needs no initialization step.
    pub async fn load(&self) -> Result<Vec<RenderRecord>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Append a completed render to the catalog.
    pub async fn append(&self, record: RenderRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        records.push(record);
        self.save(&records).await
    }

    /// All records for a project, newest first.
    pub async fn list_by_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<RenderRecord>, StoreError> {
        let mut records: Vec<RenderRecord> = self
            .load()
            .await?
            .into_iter()
            .filter(|r| r.project_id == project_id)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Linear scan by record id.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<RenderRecord>, StoreError> {
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    /// Remove a record, persist the catalog, then best-effort unlink
    /// its output file.
    ///
    /// Returns the removed record, or `None` when the id is unknown,
    /// in which case the catalog file is left untouched. The catalog
    /// is saved before the unlink, so a failure at any point leaves an
    /// orphaned file rather than a record pointing at nothing. A
    /// failed unlink is logged and does not fail the delete.
    pub async fn delete_by_id(&self, id: &str) -> Result<Option<RenderRecord>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;

        let Some(index) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = records.remove(index);
        self.save(&records).await?;

        if let Err(e) = tokio::fs::remove_file(&removed.path).await {
            tracing::warn!(
                record_id = %removed.id,
                path = %removed.path.display(),
                error = %e,
                "Failed to unlink output file for deleted render",
            );
        }

        Ok(Some(removed))
    }

    /// Overwrite the catalog file with the full record set.
    async fn save(&self, records: &[RenderRecord]) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }
}

//! Bundle handle and the revalidating cache in front of engine builds.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{EngineError, RenderEngine};

/// Opaque reference to a built bundle directory.
///
/// Shared read-only across concurrently executing jobs once built.
/// Never mutated in place: when validation fails the cache replaces the
/// handle wholesale with a freshly built one.
#[derive(Debug, Clone)]
pub struct BundleHandle {
    pub dir: PathBuf,
}

impl BundleHandle {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Lazily built, revalidated-per-acquisition bundle cache.
///
/// Bundle directories can be invalidated externally (partial writes,
/// cleanup jobs, a concurrent rebuild), so `ensure` re-probes the
/// cached handle on every acquisition instead of trusting a built-once
/// flag. A failed build leaves the slot empty; the next acquisition
/// retries from scratch with no operator intervention.
pub struct BundleCache {
    entry_point: PathBuf,
    slot: Mutex<Option<Arc<BundleHandle>>>,
}

impl BundleCache {
    pub fn new(entry_point: impl Into<PathBuf>) -> Self {
        Self {
            entry_point: entry_point.into(),
            slot: Mutex::new(None),
        }
    }

    /// Return a validated handle, building (or rebuilding) if needed.
    ///
    /// The slot lock is held across the build so concurrent jobs do not
    /// race duplicate builds; jobs that arrive while a build is in
    /// flight get the freshly built handle.
    pub async fn ensure(
        &self,
        engine: &dyn RenderEngine,
    ) -> Result<Arc<BundleHandle>, EngineError> {
        let mut slot = self.slot.lock().await;

        if let Some(handle) = slot.as_ref() {
            if engine.validate(handle).await {
                return Ok(Arc::clone(handle));
            }
            tracing::warn!(dir = %handle.dir.display(), "Cached bundle failed validation, rebuilding");
            *slot = None;
        }

        let handle = engine.build(&self.entry_point).await?;
        if !engine.validate(&handle).await {
            return Err(EngineError::Build(format!(
                "freshly built bundle at {} failed validation",
                handle.dir.display()
            )));
        }

        tracing::info!(dir = %handle.dir.display(), "Bundle built");
        let handle = Arc::new(handle);
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }
}

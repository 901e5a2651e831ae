//! Boundary to the external rendering engine.
//!
//! The engine is externally owned and opaque: it builds a servable
//! bundle from an entry point, enumerates the compositions the bundle
//! exposes, and renders one composition to an output file while
//! streaming progress events. This crate defines that narrow contract
//! ([`RenderEngine`]), the shared [`bundle::BundleCache`], and a
//! concrete [`process::ProcessRenderEngine`] that drives a renderer CLI
//! as a child process.

pub mod bundle;
pub mod events;
pub mod process;

pub use process::ProcessRenderEngine;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::bundle::BundleHandle;
use crate::events::RenderProgress;

/// A named, parameterizable render target exposed by a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub id: String,
    pub duration_in_frames: u64,
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Everything the engine needs to render one composition.
#[derive(Debug)]
pub struct RenderRequest<'a> {
    pub composition: &'a Composition,
    pub bundle: &'a BundleHandle,
    pub codec: &'a str,
    pub input_props: &'a serde_json::Value,
    pub output_path: &'a Path,
}

/// Errors raised at the engine boundary.
///
/// `Build` is fatal to the triggering job only; the bundle cache is
/// left empty so the next acquisition retries from scratch.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Bundle build failed: {0}")]
    Build(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Engine produced an unparseable response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Narrow contract to the external rendering engine.
///
/// Implementations must be safe to share across concurrently executing
/// jobs; the orchestrator holds one instance behind an `Arc`. No
/// timeout is applied to `render` here; a stalled engine call stalls
/// its worker slot until the engine returns.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Build the servable bundle from the given entry point into a
    /// fresh directory. Safe to call repeatedly.
    async fn build(&self, entry_point: &Path) -> Result<BundleHandle, EngineError>;

    /// Cheap validity probe for a previously built bundle.
    async fn validate(&self, bundle: &BundleHandle) -> bool;

    /// Enumerate the compositions the bundle exposes. The list may
    /// depend on the input props, so this runs per job.
    async fn list_compositions(
        &self,
        bundle: &BundleHandle,
        input_props: Option<&serde_json::Value>,
    ) -> Result<Vec<Composition>, EngineError>;

    /// Render one composition to `output_path`, sending zero or more
    /// progress events before returning. The sender is dropped when
    /// the render finishes, which ends the consumer's stream.
    async fn render(
        &self,
        request: RenderRequest<'_>,
        progress: mpsc::Sender<RenderProgress>,
    ) -> Result<(), EngineError>;
}

/// Default location for bundle build output, one uniquely named
/// directory per build underneath.
pub fn unique_bundle_dir(workdir: &Path) -> PathBuf {
    workdir.join(format!("bundle-{}", uuid::Uuid::new_v4()))
}

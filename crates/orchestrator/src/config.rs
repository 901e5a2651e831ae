//! Orchestrator configuration.

use std::path::PathBuf;

/// Settings for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of jobs executing simultaneously. Clamped to a
    /// minimum of 1 by the scheduler.
    pub concurrency: usize,
    /// Directory receiving rendered output files and the catalog file.
    pub output_dir: PathBuf,
    /// Entry point handed to the engine's bundle build.
    pub entry_point: PathBuf,
    /// Composition id every render targets.
    pub composition_id: String,
    /// Prefix prepended to an output file's base name to form its
    /// public download URL.
    pub public_url_prefix: String,
}

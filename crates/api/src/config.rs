use std::path::PathBuf;

use renderdeck_orchestrator::OrchestratorConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory for rendered output files and the catalog.
    pub output_dir: PathBuf,
    /// Directory receiving bundle builds.
    pub bundle_dir: PathBuf,
    /// Entry point handed to the engine's bundle build.
    pub entry_point: PathBuf,
    /// Composition id every render targets.
    pub composition_id: String,
    /// Maximum concurrently executing render jobs.
    pub render_concurrency: usize,
    /// Renderer CLI binary driven by the process engine.
    pub renderer_cmd: PathBuf,
    /// Prefix for public download URLs.
    pub public_url_prefix: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                  |
    /// |-----------------------|--------------------------|
    /// | `HOST`                | `0.0.0.0`                |
    /// | `PORT`                | `3000`                   |
    /// | `CORS_ORIGINS`        | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`| `30`                     |
    /// | `OUTPUT_DIR`          | `./renders`              |
    /// | `BUNDLE_DIR`          | `./bundles`              |
    /// | `BUNDLE_ENTRY_POINT`  | `./studio/src/index.ts`  |
    /// | `COMPOSITION_ID`      | `Main`                   |
    /// | `RENDER_CONCURRENCY`  | `2`                      |
    /// | `RENDERER_CMD`        | `renderer`               |
    /// | `PUBLIC_URL_PREFIX`   | `/renders/`              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let render_concurrency: usize = std::env::var("RENDER_CONCURRENCY")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("RENDER_CONCURRENCY must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            output_dir: std::env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| "./renders".into())
                .into(),
            bundle_dir: std::env::var("BUNDLE_DIR")
                .unwrap_or_else(|_| "./bundles".into())
                .into(),
            entry_point: std::env::var("BUNDLE_ENTRY_POINT")
                .unwrap_or_else(|_| "./studio/src/index.ts".into())
                .into(),
            composition_id: std::env::var("COMPOSITION_ID").unwrap_or_else(|_| "Main".into()),
            render_concurrency,
            renderer_cmd: std::env::var("RENDERER_CMD")
                .unwrap_or_else(|_| "renderer".into())
                .into(),
            public_url_prefix: std::env::var("PUBLIC_URL_PREFIX")
                .unwrap_or_else(|_| "/renders/".into()),
        }
    }

    /// The orchestrator's slice of this configuration.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            concurrency: self.render_concurrency,
            output_dir: self.output_dir.clone(),
            entry_point: self.entry_point.clone(),
            composition_id: self.composition_id.clone(),
            public_url_prefix: self.public_url_prefix.clone(),
        }
    }
}

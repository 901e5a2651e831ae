use std::sync::Arc;

use renderdeck_orchestrator::RenderOrchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The render job orchestrator.
    pub orchestrator: Arc<RenderOrchestrator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

use std::net::SocketAddr;
use std::sync::Arc;

use renderdeck_engine::ProcessRenderEngine;
use renderdeck_orchestrator::RenderOrchestrator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use renderdeck_api::config::ServerConfig;
use renderdeck_api::router::build_app_router;
use renderdeck_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "renderdeck=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Output directory ---
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .expect("Failed to create output directory");
    tracing::info!(output_dir = %config.output_dir.display(), "Output directory ready");

    // --- Render engine ---
    let engine = Arc::new(ProcessRenderEngine::new(
        config.renderer_cmd.clone(),
        config.bundle_dir.clone(),
    ));
    tracing::info!(
        renderer = %config.renderer_cmd.display(),
        bundle_dir = %config.bundle_dir.display(),
        "Render engine configured"
    );

    // --- Orchestrator ---
    let orchestrator = RenderOrchestrator::new(config.orchestrator_config(), engine);
    tracing::info!(
        concurrency = config.render_concurrency,
        "Render orchestrator started"
    );

    // --- App state ---
    let state = AppState {
        orchestrator,
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

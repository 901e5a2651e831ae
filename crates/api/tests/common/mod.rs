//! Shared helpers for API integration tests.
//!
//! Tests run against the full middleware stack from
//! [`renderdeck_api::router::build_app_router`], with the external
//! renderer replaced by an in-process engine stub that completes
//! renders immediately.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::mpsc;
use tower::ServiceExt;

use renderdeck_api::config::ServerConfig;
use renderdeck_api::router::build_app_router;
use renderdeck_api::state::AppState;
use renderdeck_engine::bundle::BundleHandle;
use renderdeck_engine::events::RenderProgress;
use renderdeck_engine::{Composition, EngineError, RenderEngine, RenderRequest};
use renderdeck_orchestrator::RenderOrchestrator;

/// Engine stub that renders instantly.
///
/// `build` creates a real bundle directory, `list_compositions` exposes
/// a single `Main` composition, and `render` writes a small output file
/// and reports full progress before returning.
pub struct InstantEngine;

#[async_trait]
impl RenderEngine for InstantEngine {
    async fn build(&self, entry_point: &Path) -> Result<BundleHandle, EngineError> {
        let dir = entry_point.with_extension("bundle");
        tokio::fs::create_dir_all(&dir).await?;
        Ok(BundleHandle::new(dir))
    }

    async fn validate(&self, bundle: &BundleHandle) -> bool {
        bundle.dir.is_dir()
    }

    async fn list_compositions(
        &self,
        _bundle: &BundleHandle,
        _input_props: Option<&serde_json::Value>,
    ) -> Result<Vec<Composition>, EngineError> {
        Ok(vec![Composition {
            id: "Main".to_string(),
            duration_in_frames: 120,
            fps: Some(30),
            width: Some(1920),
            height: Some(1080),
        }])
    }

    async fn render(
        &self,
        request: RenderRequest<'_>,
        progress: mpsc::Sender<RenderProgress>,
    ) -> Result<(), EngineError> {
        tokio::fs::write(request.output_path, b"video-bytes").await?;
        let _ = progress
            .send(RenderProgress {
                rendered_frames: Some(120),
                total_frames: Some(120),
            })
            .await;
        Ok(())
    }
}

/// Build a test `ServerConfig` rooted at the given temporary directory.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        output_dir: root.join("renders"),
        bundle_dir: root.join("bundles"),
        entry_point: root.join("entry"),
        composition_id: "Main".to_string(),
        render_concurrency: 2,
        renderer_cmd: PathBuf::from("renderer"),
        public_url_prefix: "/renders/".to_string(),
    }
}

/// Build the full application router over an [`InstantEngine`], rooted
/// at the given temporary directory.
///
/// This goes through the same `build_app_router` as `main.rs`, so
/// integration tests exercise the production middleware stack (CORS,
/// request ID, timeout, tracing, panic recovery).
pub fn build_test_app(root: &Path) -> Router {
    let config = test_config(root);

    let orchestrator = RenderOrchestrator::new(config.orchestrator_config(), Arc::new(InstantEngine));

    let state = AppState {
        orchestrator,
        config: Arc::new(config.clone()),
    };

    build_app_router(state, &config)
}

/// Send a GET request to the app and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and return the raw response.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a DELETE request and return the raw response.
pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the job status endpoint until the job reaches a terminal state.
///
/// Panics if the job is still running after roughly five seconds.
pub async fn wait_for_terminal(app: &Router, job_id: &str) -> serde_json::Value {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        let response = get(app.clone(), &format!("/api/v1/renders/jobs/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;

        let status = json["data"]["status"].as_str().unwrap_or_default().to_string();
        if status == "completed" || status == "failed" {
            return json;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("Job {job_id} still '{status}' after 5s");
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

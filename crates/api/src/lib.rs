//! HTTP surface for the render orchestrator.
//!
//! Exposes submission, job status, and the completed-render catalog to
//! the studio UI. Middleware, response envelope, and error mapping
//! conventions are shared between the production binary and the
//! integration tests via [`router::build_app_router`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::renders;
use crate::state::AppState;

/// Mount the `/renders` resource routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/renders",
            post(renders::submit_render).get(renders::list_renders),
        )
        .route("/renders/jobs/{id}", get(renders::get_job_status))
        .route(
            "/renders/{id}",
            get(renders::get_render).delete(renders::delete_render),
        )
}

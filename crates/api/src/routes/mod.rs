pub mod health;
pub mod renders;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /renders                POST submit, GET list (by project)
/// /renders/{id}           GET record, DELETE record
/// /renders/jobs/{id}      GET job status + queue context
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(renders::router())
}

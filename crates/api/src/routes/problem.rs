//! Route definitions for the `/problems` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::problem;
use crate::state::AppState;

/// Routes mounted at `/problems`.
///
/// ```text
/// GET  /      -> list
/// POST /      -> create (requires auth)
/// GET  /{id}  -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(problem::list).post(problem::create))
        .route("/{id}", get(problem::get_by_id))
}

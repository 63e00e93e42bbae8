//! Route definitions for the `/submissions` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::submission;
use crate::state::AppState;

/// Routes mounted at `/submissions`.
///
/// The result route is the execution harness's callback channel and takes
/// no Authorization header.
///
/// ```text
/// GET   /             -> list (requires auth)
/// POST  /             -> create (requires auth)
/// GET   /{id}         -> get_by_id (requires auth, owner-scoped)
/// PATCH /{id}/result  -> record_result (internal callback)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(submission::list).post(submission::create))
        .route("/{id}", get(submission::get_by_id))
        .route("/{id}/result", patch(submission::record_result))
}

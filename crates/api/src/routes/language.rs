//! Route definitions for the `/languages` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::language;
use crate::state::AppState;

/// Routes mounted at `/languages`.
///
/// ```text
/// GET  /      -> list
/// POST /      -> create (requires auth)
/// GET  /{id}  -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(language::list).post(language::create))
        .route("/{id}", get(language::get_by_id))
}

pub mod auth;
pub mod health;
pub mod language;
pub mod problem;
pub mod submission;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                   register (public)
/// /auth/login                      login (public)
///
/// /languages                       list (public), create (requires auth)
/// /languages/{id}                  get (public)
///
/// /problems                        list (public), create (requires auth)
/// /problems/{id}                   get (public)
///
/// /submissions                     list, create (requires auth)
/// /submissions/{id}                get (requires auth, owner-scoped)
/// /submissions/{id}/result         result callback (internal, no auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login).
        .nest("/auth", auth::router())
        // Supported languages / runtimes.
        .nest("/languages", language::router())
        // Problem catalog.
        .nest("/problems", problem::router())
        // Submissions and the harness result callback.
        .nest("/submissions", submission::router())
}

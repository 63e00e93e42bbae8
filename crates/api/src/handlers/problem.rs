//! Handlers for the `/problems` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use verdict_core::error::CoreError;
use verdict_core::types::DbId;
use verdict_db::models::problem::{CreateProblem, Problem};
use verdict_db::repositories::ProblemRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/problems
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Problem>>>> {
    let problems = ProblemRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: problems }))
}

/// GET /api/v1/problems/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Problem>>> {
    let problem = ProblemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Problem", id)))?;
    Ok(Json(DataResponse { data: problem }))
}

/// POST /api/v1/problems
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateProblem>,
) -> AppResult<(StatusCode, Json<DataResponse<Problem>>)> {
    if input.slug.trim().is_empty() || input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "slug and title must not be empty".into(),
        )));
    }

    let problem = ProblemRepo::create(&state.pool, &input).await?;
    tracing::info!(
        user_id = user.user_id,
        problem_id = problem.id,
        slug = %problem.slug,
        "Problem created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: problem })))
}

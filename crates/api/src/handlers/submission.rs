//! Handlers for the `/submissions` resource.
//!
//! Submission creation inserts the `Queued` row and its provisioning job
//! in one transaction; the worker picks the job up from there. The result
//! callback route is the write-back path for the execution harness and is
//! deliberately reachable without submitter authentication (the harness
//! holds no user credentials; the route is expected to be network-internal).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use verdict_core::error::CoreError;
use verdict_core::messages::ResultPayload;
use verdict_core::retry::{CLEANUP_GRACE_DELAY_MS, CLEANUP_RETRY_POLICY};
use verdict_core::types::{DbId, SubmissionId};
use verdict_db::models::submission::{CreateSubmission, Submission};
use verdict_db::repositories::{LanguageRepo, ProblemRepo, ResultApplication, SubmissionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /submissions`.
#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub problem_id: DbId,
    pub language_id: DbId,
    pub source_code: String,
}

/// Query parameters for `GET /submissions`.
#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    pub problem_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/submissions
///
/// Accepts a submission, stores it as `Queued`, and enqueues the
/// provisioning job atomically with the row.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateSubmissionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Submission>>)> {
    if input.source_code.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "source_code must not be empty".into(),
        )));
    }

    // Resolve the references up front so a bad id is a 400, not an FK error.
    if ProblemRepo::find_by_id(&state.pool, input.problem_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "problem {} does not exist",
            input.problem_id
        ))));
    }
    if LanguageRepo::find_by_id(&state.pool, input.language_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "language {} does not exist",
            input.language_id
        ))));
    }

    let submission = SubmissionRepo::create_queued(
        &state.pool,
        &CreateSubmission {
            problem_id: input.problem_id,
            user_id: user.user_id,
            language_id: input.language_id,
            source_code: input.source_code,
        },
    )
    .await?;

    tracing::info!(
        submission_id = %submission.id,
        user_id = user.user_id,
        problem_id = submission.problem_id,
        "Submission accepted and queued"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: submission })))
}

/// GET /api/v1/submissions/{id}
///
/// Owner-scoped: a submission belonging to another user reads as absent.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<SubmissionId>,
) -> AppResult<Json<DataResponse<Submission>>> {
    let submission = SubmissionRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|s| s.user_id == user.user_id)
        .ok_or_else(|| AppError::Core(CoreError::not_found("Submission", id)))?;
    Ok(Json(DataResponse { data: submission }))
}

/// GET /api/v1/submissions
///
/// Lists the caller's submissions, newest first. Supports `problem_id`,
/// `limit`, and `offset` query parameters.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListSubmissionsQuery>,
) -> AppResult<Json<DataResponse<Vec<Submission>>>> {
    let submissions = SubmissionRepo::list_by_user(
        &state.pool,
        user.user_id,
        query.problem_id,
        query.limit,
        query.offset,
    )
    .await?;
    Ok(Json(DataResponse { data: submissions }))
}

/// PATCH /api/v1/submissions/{id}/result
///
/// Result callback from the execution harness. First terminal write wins:
/// a duplicate delivery is acknowledged with the already-recorded row and
/// enqueues nothing. A payload with an unknown status fails deserialization
/// before any state is touched.
pub async fn record_result(
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
    Json(payload): Json<ResultPayload>,
) -> AppResult<Json<DataResponse<Submission>>> {
    let application = SubmissionRepo::apply_result(
        &state.pool,
        id,
        &payload,
        chrono::Duration::milliseconds(CLEANUP_GRACE_DELAY_MS),
        &CLEANUP_RETRY_POLICY,
    )
    .await?;

    let submission = match application {
        ResultApplication::Applied {
            submission,
            cleanup_enqueued,
        } => {
            tracing::info!(
                submission_id = %id,
                status = %submission.status,
                cleanup_enqueued,
                "Result recorded"
            );
            submission
        }
        ResultApplication::AlreadyTerminal(submission) => {
            tracing::debug!(
                submission_id = %id,
                status = %submission.status,
                "Duplicate result delivery ignored"
            );
            submission
        }
        ResultApplication::NotFound => {
            return Err(AppError::Core(CoreError::not_found("Submission", id)));
        }
    };

    Ok(Json(DataResponse { data: submission }))
}

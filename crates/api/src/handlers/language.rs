//! Handlers for the `/languages` resource.
//!
//! A language's `extension` selects the runtime image that executes
//! submissions written in it, so the set of languages doubles as the set
//! of supported runtimes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use verdict_core::error::CoreError;
use verdict_core::types::DbId;
use verdict_db::models::language::{CreateLanguage, Language};
use verdict_db::repositories::LanguageRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/languages
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Language>>>> {
    let languages = LanguageRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: languages }))
}

/// GET /api/v1/languages/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Language>>> {
    let language = LanguageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Language", id)))?;
    Ok(Json(DataResponse { data: language }))
}

/// POST /api/v1/languages
///
/// Registering a language only declares the runtime image name; the image
/// itself must exist in the container registry.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateLanguage>,
) -> AppResult<(StatusCode, Json<DataResponse<Language>>)> {
    if input.name.trim().is_empty() || input.extension.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name and extension must not be empty".into(),
        )));
    }

    let language = LanguageRepo::create(&state.pool, &input).await?;
    tracing::info!(
        user_id = user.user_id,
        language = %language.name,
        extension = %language.extension,
        "Language registered"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: language })))
}

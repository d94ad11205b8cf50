use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
    users::UserRole,
};

use super::dto::{CreatedQuestionResponse, MutatedResponse, QuestionRequest};
use super::repo::TriviaQuestion;

const LIST_CACHE_KEY: &str = "/api/trivia-questions-database";

/// POST /api/trivia-questions-database
#[instrument(skip(state, user, payload))]
pub async fn create_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<QuestionRequest>,
) -> ApiResult<Json<CreatedQuestionResponse>> {
    user.require_role(&[UserRole::Admin, UserRole::User])?;
    let validated = payload.validate()?;

    let id = TriviaQuestion::insert(&state.db, &validated)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    state.question_cache.invalidate();

    info!(user_id = %user.id, question_id = id, "trivia question added");
    Ok(Json(CreatedQuestionResponse { success: true, id }))
}

/// GET /api/trivia-questions-database
///
/// The cache is consulted only after the principal extractor succeeded,
/// so anonymous callers never see a cached response.
#[instrument(skip(state, _user))]
pub async fn list_questions(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    if let Some(cached) = state.question_cache.get(LIST_CACHE_KEY) {
        return Ok(Json(cached));
    }

    let rows = TriviaQuestion::list(&state.db)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let body = serde_json::to_value(rows).map_err(|e| ApiError::Internal(e.to_string()))?;
    state.question_cache.insert(LIST_CACHE_KEY, body.clone());
    Ok(Json(body))
}

/// GET /api/trivia-questions-database/:id
#[instrument(skip(state, _user))]
pub async fn get_question(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<TriviaQuestion>> {
    let question = TriviaQuestion::find(&state.db, id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Question not found".into()))?;
    Ok(Json(question))
}

/// PUT /api/trivia-questions-database/:id. Mutates bank content, never a
/// user's answer history.
#[instrument(skip(state, user, payload))]
pub async fn update_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<QuestionRequest>,
) -> ApiResult<Json<MutatedResponse>> {
    let validated = payload.validate()?;

    let updated = TriviaQuestion::update(&state.db, id, &validated)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !updated {
        return Err(ApiError::NotFound("Question not found".into()));
    }
    state.question_cache.invalidate();

    info!(user_id = %user.id, question_id = id, "trivia question updated");
    Ok(Json(MutatedResponse { success: true }))
}

/// DELETE /api/trivia-questions-database/:id. Admin only.
#[instrument(skip(state, user))]
pub async fn delete_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<MutatedResponse>> {
    user.require_role(&[UserRole::Admin])?;

    let deleted = TriviaQuestion::delete(&state.db, id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !deleted {
        return Err(ApiError::NotFound("Question not found".into()));
    }
    state.question_cache.invalidate();

    info!(user_id = %user.id, question_id = id, "trivia question deleted");
    Ok(Json(MutatedResponse { success: true }))
}

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::dto::{DeletedResponse, SaveResultRequest, SavedResultResponse};
use super::repo::TriviaResult;

/// POST /save-trivia-result and POST /save-trivia-answer.
#[instrument(skip(state, user, payload))]
pub async fn save_result(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<SaveResultRequest>,
) -> ApiResult<Json<SavedResultResponse>> {
    let validated = payload.validate()?;

    let id = TriviaResult::insert(&state.db, &user.id, &validated)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(user_id = %user.id, result_id = id, "trivia result saved");
    Ok(Json(SavedResultResponse { success: true, id }))
}

/// GET /api/my-trivia-results. Newest first; empty list when none.
#[instrument(skip(state, user))]
pub async fn list_my_results(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<TriviaResult>>> {
    let rows = TriviaResult::list_by_user(&state.db, &user.id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(rows))
}

/// DELETE /api/my-trivia-results/:id. Deletes only the owning user's row.
#[instrument(skip(state, user))]
pub async fn delete_my_result(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<DeletedResponse>> {
    let deleted = TriviaResult::delete_owned(&state.db, &user.id, id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !deleted {
        return Err(ApiError::NotFound(
            "Result not found or not authorized".into(),
        ));
    }
    info!(user_id = %user.id, result_id = id, "trivia result deleted");
    Ok(Json(DeletedResponse {
        success: true,
        message: "Result deleted successfully".into(),
    }))
}

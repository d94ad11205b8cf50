mod dto;
pub mod handlers;
mod repo;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Save endpoints live at the root (historic frontend paths).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/save-trivia-result", post(handlers::save_result))
        .route("/save-trivia-answer", post(handlers::save_result))
}

/// Nested under `/api` alongside the rate limiter.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/my-trivia-results", get(handlers::list_my_results))
        .route("/my-trivia-results/:id", axum::routing::delete(handlers::delete_my_result))
}

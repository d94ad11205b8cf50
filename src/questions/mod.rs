mod dto;
pub mod handlers;
mod repo;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Question-bank CRUD, nested under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/trivia-questions-database",
            get(handlers::list_questions).post(handlers::create_question),
        )
        .route(
            "/trivia-questions-database/:id",
            get(handlers::get_question)
                .put(handlers::update_question)
                .delete(handlers::delete_question),
        )
}

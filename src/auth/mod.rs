use axum::{routing::get, Router};

use crate::state::AppState;

pub mod extractors;
pub mod handlers;
pub mod provider;
pub mod session;

pub use extractors::CurrentUser;

/// Browser-facing auth routes (redirect flows, no JSON errors).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/:provider", get(handlers::login_start))
        .route("/auth/:provider/callback", get(handlers::login_callback))
        .route("/logout", get(handlers::logout))
}

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use tower_cookies::Cookies;

use crate::{
    auth::{extractors::CurrentUser, session},
    state::AppState,
    users::User,
};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

fn login_failed_redirect(frontend_url: &str) -> Redirect {
    Redirect::temporary(&format!("{frontend_url}/?error=login_failed"))
}

/// GET /auth/:provider. Sends the browser to the provider consent screen.
#[instrument(skip(state, cookies))]
pub async fn login_start(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    let Some(provider) = state.providers.get(&provider) else {
        warn!(%provider, "login for unknown provider");
        return Redirect::temporary(&format!(
            "{}/?error=unknown_provider",
            state.config.frontend_url
        ));
    };

    let (auth_url, csrf_state) = provider.authorize();
    session::set_oauth_state(
        &cookies,
        &state.cookie_key,
        provider.name(),
        csrf_state.secret(),
    );
    Redirect::temporary(auth_url.as_str())
}

/// GET /auth/:provider/callback. Finishes the handshake; failures never
/// create a session; they redirect back with an error query flag.
#[instrument(skip(state, cookies, query))]
pub async fn login_callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(provider_name): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let frontend = state.config.frontend_url.clone();

    let Some(provider) = state.providers.get(&provider_name) else {
        warn!(provider = %provider_name, "callback for unknown provider");
        return login_failed_redirect(&frontend);
    };

    if let Some(err) = query.error {
        warn!(provider = %provider_name, provider_error = %err, "provider reported failure");
        return login_failed_redirect(&frontend);
    }
    let (Some(code), Some(state_param)) = (query.code, query.state) else {
        warn!(provider = %provider_name, "callback missing code or state");
        return login_failed_redirect(&frontend);
    };

    match session::take_oauth_state(&cookies, &state.cookie_key, &provider_name) {
        Some(stored) if stored == state_param => {}
        _ => {
            warn!(provider = %provider_name, "oauth state missing or mismatched");
            return login_failed_redirect(&frontend);
        }
    }

    let profile = match provider.exchange_callback(&state.http, code).await {
        Ok(p) => p,
        Err(e) => {
            error!(provider = %provider_name, error = %e, "callback exchange failed");
            return login_failed_redirect(&frontend);
        }
    };

    // Best-effort persistence: a failed upsert is logged but never blocks
    // the handshake.
    if let Err(e) = User::upsert_profile(&state.db, &profile).await {
        error!(error = %e, user_id = %profile.id, "user upsert failed");
    }

    session::set_session(
        &cookies,
        &state.cookie_key,
        &profile.id,
        state.config.session_ttl_minutes,
    );
    info!(user_id = %profile.id, provider = %profile.provider, "user logged in");
    Redirect::temporary(&frontend)
}

/// GET /logout. Invalidates the session; in ephemeral-account mode also
/// drop the user row (their results stay).
#[instrument(skip(state, cookies))]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    if let Some(session) = session::get_session(&cookies, &state.cookie_key) {
        if state.config.ephemeral_accounts {
            if let Err(e) = User::delete(&state.db, &session.user_id).await {
                error!(error = %e, user_id = %session.user_id, "ephemeral user delete failed");
            }
        }
        info!(user_id = %session.user_id, "user logged out");
    }
    session::clear_session(&cookies, &state.cookie_key);
    Redirect::temporary(&state.config.frontend_url)
}

/// GET /api/user
#[instrument(skip(user))]
pub async fn api_user(user: CurrentUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        display_name: user.display_name,
    })
}

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

const MAX_AMOUNT: u32 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct TriviaQuery {
    pub amount: Option<u32>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub r#type: Option<String>,
}

/// Filters equal to the sentinel `any` (or absent) are left out of the
/// upstream request entirely.
fn filter(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        None | Some("") | Some("any") => None,
        Some(v) => Some(v),
    }
}

/// Filter values are percent-encoded; a crafted value never adds extra
/// upstream parameters.
pub fn build_upstream_url(base: &str, query: &TriviaQuery) -> ApiResult<reqwest::Url> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| ApiError::Internal(format!("bad trivia source url: {e}")))?;
    // amount defaults to one question (the interactive flow); the bulk
    // flow may ask for more, capped at the source's maximum
    let amount = query.amount.unwrap_or(1).clamp(1, MAX_AMOUNT);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("amount", &amount.to_string());
        if let Some(category) = filter(&query.category) {
            pairs.append_pair("category", category);
        }
        if let Some(difficulty) = filter(&query.difficulty) {
            pairs.append_pair("difficulty", difficulty);
        }
        if let Some(kind) = filter(&query.r#type) {
            pairs.append_pair("type", kind);
        }
    }
    Ok(url)
}

/// GET /get-trivia. Unauthenticated read-only proxy: the upstream JSON
/// is relayed verbatim; any upstream failure surfaces as a 500 carrying
/// the underlying message, with no retry and no fallback source.
#[instrument(skip(state))]
pub async fn get_trivia(
    State(state): State<AppState>,
    Query(query): Query<TriviaQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let url = build_upstream_url(&state.config.trivia_api_url, &query)?;

    let response = state.http.get(url).send().await.map_err(|e| {
        warn!(error = %e, "trivia source unreachable");
        ApiError::Upstream(e.to_string())
    })?;
    let response = response.error_for_status().map_err(|e| {
        warn!(error = %e, "trivia source returned an error status");
        ApiError::Upstream(e.to_string())
    })?;

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    Ok(Json(body))
}

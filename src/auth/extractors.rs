use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use tower_cookies::Cookies;

use crate::{
    auth::session,
    error::ApiError,
    state::AppState,
    users::{User, UserRole},
};

/// The immutable per-request principal. Extraction fails with 401 unless
/// the request carries a live session whose user row still exists.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub role: UserRole,
    pub display_name: String,
}

impl CurrentUser {
    /// Role gate; authentication has already been checked by extraction.
    pub fn require_role(&self, allowed: &[UserRole]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.user_type,
            display_name: user.display_name,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized)?;

        let session =
            session::get_session(&cookies, &state.cookie_key).ok_or(ApiError::Unauthorized)?;

        let user = User::find_by_id(&state.db, &session.user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %session.user_id, "principal lookup failed");
                ApiError::Internal(e.to_string())
            })?
            .ok_or(ApiError::Unauthorized)?;

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_gate_is_a_pure_check() {
        let admin = CurrentUser {
            id: "1".into(),
            role: UserRole::Admin,
            display_name: "a".into(),
        };
        let user = CurrentUser {
            id: "2".into(),
            role: UserRole::User,
            display_name: "u".into(),
        };
        assert!(admin.require_role(&[UserRole::Admin]).is_ok());
        assert!(user.require_role(&[UserRole::Admin]).is_err());
        assert!(user.require_role(&[UserRole::Admin, UserRole::User]).is_ok());
    }
}

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::auth::provider::CanonicalProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Provider-assigned id; stable across logins.
    pub id: String,
    pub user_type: UserRole,
    pub display_name: String,
    pub email: Option<String>,
    pub provider: String,
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, user_type, display_name, email, provider
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Upsert the canonical profile on login. Touches only the identity
    /// fields; `user_type` is written once at insert and survives
    /// re-login, so an admin promotion is never reset.
    pub async fn upsert_profile(db: &PgPool, profile: &CanonicalProfile) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, display_name, email, provider)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                provider = EXCLUDED.provider
            RETURNING id, user_type, display_name, email, provider
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.display_name)
        .bind(&profile.email)
        .bind(&profile.provider)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Used by logout in ephemeral-account mode. Pre-existing results are
    /// deliberately left in place.
    pub async fn delete(db: &PgPool, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&UserRole::User).unwrap(), "\"user\"");
    }

    #[test]
    fn user_serialization_skips_nothing_public() {
        let user = User {
            id: "12345".into(),
            user_type: UserRole::User,
            display_name: "Test User".into(),
            email: None,
            provider: "github".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["display_name"], "Test User");
        assert_eq!(json["email"], serde_json::Value::Null);
    }
}

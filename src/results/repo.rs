use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::dto::ValidatedResult;

/// One answered question. Immutable once created except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TriviaResult {
    pub id: i32,
    pub user_id: String,
    pub question_difficulty: Option<String>,
    pub question_category: Option<String>,
    pub question: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TriviaResult {
    /// Insert stamped with the caller's id; returns the new row id.
    pub async fn insert(db: &PgPool, user_id: &str, result: &ValidatedResult) -> anyhow::Result<i32> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO trivia_results
                (user_id, question_difficulty, question_category, question,
                 correct_answer, user_answer, is_correct)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&result.question_difficulty)
        .bind(&result.question_category)
        .bind(&result.question)
        .bind(&result.correct_answer)
        .bind(&result.user_answer)
        .bind(result.is_correct)
        .fetch_one(db)
        .await?;
        Ok(id)
    }

    pub async fn list_by_user(db: &PgPool, user_id: &str) -> anyhow::Result<Vec<TriviaResult>> {
        let rows = sqlx::query_as::<_, TriviaResult>(
            r#"
            SELECT id, user_id, question_difficulty, question_category, question,
                   correct_answer, user_answer, is_correct, created_at
            FROM trivia_results
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Deletes only when both id and owner match; false when nothing
    /// matched, which deliberately covers "belongs to someone else".
    pub async fn delete_owned(db: &PgPool, user_id: &str, id: i32) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM trivia_results WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_result() -> ValidatedResult {
        ValidatedResult {
            question_difficulty: Some("easy".into()),
            question_category: Some("Science".into()),
            question: "Is water wet?".into(),
            correct_answer: "Yes".into(),
            user_answer: "Yes".into(),
            is_correct: true,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn delete_only_matches_the_owners_rows(pool: PgPool) {
        let id = TriviaResult::insert(&pool, "google:1", &sample_result())
            .await
            .unwrap();

        // another user cannot delete it, and the row survives the attempt
        assert!(!TriviaResult::delete_owned(&pool, "github:2", id).await.unwrap());
        let remaining = TriviaResult::list_by_user(&pool, "google:1").await.unwrap();
        assert_eq!(remaining.len(), 1);

        assert!(TriviaResult::delete_owned(&pool, "google:1", id).await.unwrap());
        assert!(TriviaResult::list_by_user(&pool, "google:1")
            .await
            .unwrap()
            .is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn list_returns_own_rows_newest_first(pool: PgPool) {
        // deliberately inserted out of chronological order
        for (user_id, question, created_at) in [
            ("google:1", "oldest", datetime!(2026-01-01 00:00:00 UTC)),
            ("google:1", "newest", datetime!(2026-01-03 00:00:00 UTC)),
            ("github:2", "other user", datetime!(2026-01-04 00:00:00 UTC)),
            ("google:1", "middle", datetime!(2026-01-02 00:00:00 UTC)),
        ] {
            sqlx::query(
                r#"
                INSERT INTO trivia_results
                    (user_id, question, correct_answer, user_answer, is_correct, created_at)
                VALUES ($1, $2, 'A', 'A', TRUE, $3)
                "#,
            )
            .bind(user_id)
            .bind(question)
            .bind(created_at)
            .execute(&pool)
            .await
            .unwrap();
        }

        let rows = TriviaResult::list_by_user(&pool, "google:1").await.unwrap();
        assert!(rows.iter().all(|r| r.user_id == "google:1"));
        assert_eq!(
            rows.iter().map(|r| r.question.as_str()).collect::<Vec<_>>(),
            ["newest", "middle", "oldest"]
        );
        assert!(rows.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn result_serializes_rfc3339_timestamp() {
        let row = TriviaResult {
            id: 1,
            user_id: "U1".into(),
            question_difficulty: Some("easy".into()),
            question_category: Some("Science".into()),
            question: "Is water wet?".into(),
            correct_answer: "Yes".into(),
            user_answer: "No".into(),
            is_correct: false,
            created_at: datetime!(2026-01-02 03:04:05 UTC),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["created_at"], "2026-01-02T03:04:05Z");
        assert_eq!(json["is_correct"], false);
    }
}

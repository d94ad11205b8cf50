use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::dto::ValidatedQuestion;

/// A question-bank entry. Distinct from a user's answer history: bank
/// rows carry no owner and are mutated through role-gated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TriviaQuestion {
    pub id: i32,
    pub question_category: Option<String>,
    pub question: String,
    pub correct_answer: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TriviaQuestion {
    pub async fn insert(db: &PgPool, question: &ValidatedQuestion) -> anyhow::Result<i32> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO trivia_questions (question_category, question, correct_answer)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&question.question_category)
        .bind(&question.question)
        .bind(&question.correct_answer)
        .fetch_one(db)
        .await?;
        Ok(id)
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<TriviaQuestion>> {
        let rows = sqlx::query_as::<_, TriviaQuestion>(
            r#"
            SELECT id, question_category, question, correct_answer, created_at
            FROM trivia_questions
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: i32) -> anyhow::Result<Option<TriviaQuestion>> {
        let row = sqlx::query_as::<_, TriviaQuestion>(
            r#"
            SELECT id, question_category, question, correct_answer, created_at
            FROM trivia_questions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn update(db: &PgPool, id: i32, question: &ValidatedQuestion) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE trivia_questions
            SET question_category = $1, question = $2, correct_answer = $3
            WHERE id = $4
            "#,
        )
        .bind(&question.question_category)
        .bind(&question.question)
        .bind(&question.correct_answer)
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &PgPool, id: i32) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM trivia_questions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

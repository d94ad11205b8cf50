use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Body of the save-result/save-answer endpoints. Fields are optional so
/// that a missing field reports as a 400 with a named field instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct SaveResultRequest {
    pub question_difficulty: Option<String>,
    pub question_category: Option<String>,
    pub question: Option<String>,
    pub correct_answer: Option<String>,
    pub user_answer: Option<String>,
    pub is_correct: Option<bool>,
}

#[derive(Debug)]
pub struct ValidatedResult {
    pub question_difficulty: Option<String>,
    pub question_category: Option<String>,
    pub question: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
}

fn required(field: Option<String>, name: &str) -> Result<String, ApiError> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{name} is required"))),
    }
}

impl SaveResultRequest {
    /// Runs before any write; no partial state on failure.
    pub fn validate(self) -> Result<ValidatedResult, ApiError> {
        Ok(ValidatedResult {
            question_difficulty: self.question_difficulty,
            question_category: self.question_category,
            question: required(self.question, "question")?,
            correct_answer: required(self.correct_answer, "correct_answer")?,
            user_answer: required(self.user_answer, "user_answer")?,
            is_correct: self
                .is_correct
                .ok_or_else(|| ApiError::BadRequest("is_correct is required".into()))?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SavedResultResponse {
    pub success: bool,
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}

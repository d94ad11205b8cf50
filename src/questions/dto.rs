use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question_category: Option<String>,
    pub question: Option<String>,
    pub correct_answer: Option<String>,
}

#[derive(Debug)]
pub struct ValidatedQuestion {
    pub question_category: Option<String>,
    pub question: String,
    pub correct_answer: String,
}

fn required(field: Option<String>, name: &str) -> Result<String, ApiError> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{name} is required"))),
    }
}

impl QuestionRequest {
    pub fn validate(self) -> Result<ValidatedQuestion, ApiError> {
        Ok(ValidatedQuestion {
            question_category: self.question_category,
            question: required(self.question, "question")?,
            correct_answer: required(self.correct_answer, "correct_answer")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedQuestionResponse {
    pub success: bool,
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct MutatedResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_optional() {
        let req = QuestionRequest {
            question_category: None,
            question: Some("What is the capital of France?".into()),
            correct_answer: Some("Paris".into()),
        };
        let v = req.validate().unwrap();
        assert_eq!(v.question_category, None);
    }

    #[test]
    fn question_is_required() {
        let req = QuestionRequest {
            question_category: Some("Geography".into()),
            question: None,
            correct_answer: Some("Paris".into()),
        };
        assert!(matches!(req.validate(), Err(ApiError::BadRequest(_))));
    }
}

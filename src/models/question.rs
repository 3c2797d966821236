// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Points awarded for a correct answer when the row carries none.
pub const DEFAULT_POINTS: i64 = 10;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,

    /// The text content of the question.
    pub question_text: String,

    /// Only 'multiple_choice' is ever produced.
    pub question_type: String,

    /// Must equal one of the option strings to be answerable.
    pub correct_answer: String,

    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,

    /// Explanation shown after the question has been answered.
    pub explanation: Option<String>,

    pub points: Option<i64>,
}

impl Question {
    /// The non-empty options in display order (A to D).
    pub fn options(&self) -> Vec<String> {
        [&self.option_a, &self.option_b, &self.option_c, &self.option_d]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }

    pub fn point_value(&self) -> i64 {
        self.points.unwrap_or(DEFAULT_POINTS)
    }

    /// Exact string comparison, no normalization. An empty answer never matches.
    pub fn is_correct(&self, answer: &str) -> bool {
        !answer.is_empty() && answer == self.correct_answer
    }

    pub fn explanation_text(&self) -> String {
        self.explanation.clone().unwrap_or_default()
    }
}

/// DTO for sending a question to the client (excludes answer and explanation).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    pub question_type: String,
    pub options: Vec<String>,
    pub points: i64,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        PublicQuestion {
            id: q.id,
            question_text: q.question_text.clone(),
            question_type: q.question_type.clone(),
            options: q.options(),
            points: q.point_value(),
        }
    }
}

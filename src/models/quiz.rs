// src/models/quiz.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category_id: i64,

    /// Free-form label: 'Easy', 'Medium', 'Hard'.
    pub difficulty: String,

    /// Overall time limit in seconds. Informational only.
    pub time_limit: i64,

    /// Creating user. Seeded quizzes have none.
    pub created_by: Option<i64>,

    pub is_public: bool,
    pub plays_count: i64,

    /// Written at seed time only.
    pub average_score: f64,

    pub created_at: NaiveDateTime,
}

/// Quiz row annotated with its question count (category listing).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub quiz: Quiz,
    pub question_count: i64,
}

/// Quiz joined with its category's display name and icon.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub quiz: Quiz,
    pub category_name: String,
    pub category_icon: String,
}

/// Headline shown on the results page.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuizInfo {
    pub title: String,
    pub category_name: String,
    pub category_icon: String,
}

impl From<&QuizDetail> for QuizInfo {
    fn from(detail: &QuizDetail) -> Self {
        QuizInfo {
            title: detail.quiz.title.clone(),
            category_name: detail.category_name.clone(),
            category_icon: detail.category_icon.clone(),
        }
    }
}

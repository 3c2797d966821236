// src/models/category.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'categories' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,

    /// Unique display name, also used as the URL key (`/category/{name}`).
    pub name: String,

    /// Emoji glyph shown next to the name.
    pub icon: String,

    /// CSS color, e.g. `#4CAF50`.
    pub color: String,

    pub description: Option<String>,

    /// Denormalized count of questions across the category's quizzes.
    /// Recomputed by an aggregate query, never maintained incrementally.
    pub question_count: i64,
}

/// A category annotated with the number of quizzes referencing it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithQuizCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: Category,
    pub quiz_count: i64,
}

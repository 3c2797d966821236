// src/models/game_session.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'game_sessions' table: one immutable row per completed attempt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GameSession {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,

    /// Whole seconds between attempt start and completion.
    pub time_taken: i64,

    pub completed_at: NaiveDateTime,
}

/// Dashboard row: a game session joined with its quiz title and category.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentGame {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub session: GameSession,
    pub title: String,
    pub category_name: String,
    pub icon: String,
}

/// Input for recording a finished attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedAttempt {
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub time_taken: i64,
}

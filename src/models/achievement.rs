// src/models/achievement.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'achievements' table. Display-only catalog data;
/// conditions are never evaluated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,

    /// e.g. 'games_played', 'perfect_score', 'streak'.
    pub condition_type: Option<String>,
    pub condition_value: Option<i64>,
    pub points_reward: i64,
}

/// An achievement definition left-joined with the time a user earned it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAchievement {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub achievement: Achievement,
    pub earned_at: Option<NaiveDateTime>,
}

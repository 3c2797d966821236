// src/store/mod.rs

//! Catalog Store: categories, quizzes, questions, users and completed attempts.
//!
//! Handlers and the attempt state machine only see the [`CatalogStore`] trait;
//! [`SqliteCatalog`] is the production implementation.

pub mod seed;
pub mod sqlite;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, migrate::Migrator};

use crate::models::{
    achievement::UserAchievement,
    category::{Category, CategoryWithQuizCount},
    game_session::{CompletedAttempt, GameSession, RecentGame},
    question::Question,
    quiz::{QuizDetail, QuizSummary},
    user::User,
};

pub use sqlite::{SqliteCatalog, connect_pool};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Row counts of the catalog tables.
#[derive(Debug, Clone, Copy, FromRow, Serialize, PartialEq, Eq)]
pub struct CatalogCounts {
    pub categories: i64,
    pub quizzes: i64,
    pub questions: i64,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All categories ordered by name, each with the number of quizzes
    /// referencing it (0 for empty categories).
    async fn list_categories_with_quiz_counts(&self) -> StoreResult<Vec<CategoryWithQuizCount>>;

    async fn get_category_by_name(&self, name: &str) -> StoreResult<Option<Category>>;

    /// Quizzes of a category with their question counts, newest first.
    async fn list_quizzes_in_category(&self, category_id: i64) -> StoreResult<Vec<QuizSummary>>;

    async fn get_quiz_with_category(&self, quiz_id: i64) -> StoreResult<Option<QuizDetail>>;

    /// Every question of a quiz, correct answers included, in no particular order.
    async fn list_all_questions(&self, quiz_id: i64) -> StoreResult<Vec<Question>>;

    /// Appends the game session row and folds the result into the user's totals:
    /// `total_score += score`, `games_played += 1`,
    /// `best_streak = max(best_streak, correct_answers)`.
    async fn record_completed_attempt(&self, attempt: &CompletedAttempt)
    -> StoreResult<GameSession>;

    /// A uniformly random quiz id, `None` when the catalog is empty.
    async fn pick_random_quiz_id(&self) -> StoreResult<Option<i64>>;

    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool>;

    async fn create_user(&self, username: &str, email: &str, password_hash: &str)
    -> StoreResult<User>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn get_user(&self, user_id: i64) -> StoreResult<Option<User>>;

    async fn recent_games(&self, user_id: i64, limit: i64) -> StoreResult<Vec<RecentGame>>;

    /// Every achievement definition, with `earned_at` set for the ones the user holds.
    async fn achievements_for_user(&self, user_id: i64) -> StoreResult<Vec<UserAchievement>>;

    async fn catalog_counts(&self) -> StoreResult<CatalogCounts>;
}

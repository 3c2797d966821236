// src/store/sqlite.rs

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use super::{CatalogCounts, CatalogStore, StoreResult};
use crate::models::{
    achievement::UserAchievement,
    category::{Category, CategoryWithQuizCount},
    game_session::{CompletedAttempt, GameSession, RecentGame},
    question::Question,
    quiz::{QuizDetail, QuizSummary},
    user::User,
};

const QUIZ_COLUMNS: &str = "q.id, q.title, q.description, q.category_id, q.difficulty, \
    q.time_limit, q.created_by, q.is_public, q.plays_count, q.average_score, q.created_at";

const USER_COLUMNS: &str = "id, username, email, password, avatar, total_score, \
    games_played, best_streak, favorite_category, created_at";

/// Opens a SQLite pool, creating the database file if needed.
///
/// Connections are never recycled so that `sqlite::memory:` databases
/// survive for the lifetime of the pool.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// [`CatalogStore`] backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Recomputes the denormalized `categories.question_count` column.
    pub async fn recompute_category_question_counts(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE categories SET question_count = (
                SELECT COUNT(qs.id)
                FROM questions qs
                JOIN quizzes qz ON qs.quiz_id = qz.id
                WHERE qz.category_id = categories.id
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn list_categories_with_quiz_counts(&self) -> StoreResult<Vec<CategoryWithQuizCount>> {
        sqlx::query_as::<_, CategoryWithQuizCount>(
            r#"
            SELECT
                c.id, c.name, c.icon, c.color, c.description, c.question_count,
                COUNT(q.id) AS quiz_count
            FROM categories c
            LEFT JOIN quizzes q ON c.id = q.category_id
            GROUP BY c.id
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, icon, color, description, question_count FROM categories WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_quizzes_in_category(&self, category_id: i64) -> StoreResult<Vec<QuizSummary>> {
        let sql = format!(
            r#"
            SELECT {QUIZ_COLUMNS}, COUNT(qs.id) AS question_count
            FROM quizzes q
            LEFT JOIN questions qs ON q.id = qs.quiz_id
            WHERE q.category_id = ?
            GROUP BY q.id
            ORDER BY q.created_at DESC, q.id DESC
            "#
        );

        sqlx::query_as::<_, QuizSummary>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_quiz_with_category(&self, quiz_id: i64) -> StoreResult<Option<QuizDetail>> {
        let sql = format!(
            r#"
            SELECT {QUIZ_COLUMNS}, c.name AS category_name, c.icon AS category_icon
            FROM quizzes q
            JOIN categories c ON q.category_id = c.id
            WHERE q.id = ?
            "#
        );

        sqlx::query_as::<_, QuizDetail>(&sql)
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_all_questions(&self, quiz_id: i64) -> StoreResult<Vec<Question>> {
        sqlx::query_as::<_, Question>(
            r#"
            SELECT
                id, quiz_id, question_text, question_type, correct_answer,
                option_a, option_b, option_c, option_d, explanation, points
            FROM questions
            WHERE quiz_id = ?
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn record_completed_attempt(
        &self,
        attempt: &CompletedAttempt,
    ) -> StoreResult<GameSession> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, GameSession>(
            r#"
            INSERT INTO game_sessions (user_id, quiz_id, score, total_questions, correct_answers, time_taken)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, quiz_id, score, total_questions, correct_answers, time_taken, completed_at
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.quiz_id)
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .bind(attempt.correct_answers)
        .bind(attempt.time_taken)
        .fetch_one(&mut *tx)
        .await?;

        // best_streak takes the attempt's correct count, not a consecutive run
        sqlx::query(
            r#"
            UPDATE users SET
                total_score = total_score + ?,
                games_played = games_played + 1,
                best_streak = MAX(best_streak, ?)
            WHERE id = ?
            "#,
        )
        .bind(attempt.score)
        .bind(attempt.correct_answers)
        .bind(attempt.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(session)
    }

    async fn pick_random_quiz_id(&self) -> StoreResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes ORDER BY RANDOM() LIMIT 1")
            .fetch_optional(&self.pool)
            .await
    }

    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? OR email = ?)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user(&self, user_id: i64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");

        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn recent_games(&self, user_id: i64, limit: i64) -> StoreResult<Vec<RecentGame>> {
        sqlx::query_as::<_, RecentGame>(
            r#"
            SELECT
                gs.id, gs.user_id, gs.quiz_id, gs.score, gs.total_questions,
                gs.correct_answers, gs.time_taken, gs.completed_at,
                q.title, c.name AS category_name, c.icon
            FROM game_sessions gs
            JOIN quizzes q ON gs.quiz_id = q.id
            JOIN categories c ON q.category_id = c.id
            WHERE gs.user_id = ?
            ORDER BY gs.completed_at DESC, gs.id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn achievements_for_user(&self, user_id: i64) -> StoreResult<Vec<UserAchievement>> {
        sqlx::query_as::<_, UserAchievement>(
            r#"
            SELECT
                a.id, a.name, a.description, a.icon, a.condition_type,
                a.condition_value, a.points_reward, ua.earned_at
            FROM achievements a
            LEFT JOIN user_achievements ua ON a.id = ua.achievement_id AND ua.user_id = ?
            ORDER BY ua.earned_at IS NULL, ua.earned_at DESC, a.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn catalog_counts(&self) -> StoreResult<CatalogCounts> {
        sqlx::query_as::<_, CatalogCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM categories) AS categories,
                (SELECT COUNT(*) FROM quizzes) AS quizzes,
                (SELECT COUNT(*) FROM questions) AS questions
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }
}

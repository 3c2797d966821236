// src/store/seed.rs

use serde::Deserialize;

use super::SqliteCatalog;

const SEED_CATALOG: &str = include_str!("../../seed/catalog.json");

/// Time limit given to every seeded quiz, in seconds.
const SEED_TIME_LIMIT: i64 = 300;

#[derive(Debug, Deserialize)]
pub struct SeedCatalog {
    pub categories: Vec<SeedCategory>,
    pub quizzes: Vec<SeedQuiz>,
    pub achievements: Vec<SeedAchievement>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedQuiz {
    /// Name of an entry in `categories`.
    pub category: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub questions: Vec<SeedQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct SeedQuestion {
    pub text: String,
    pub correct_answer: String,
    pub options: [String; 4],
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedAchievement {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub condition_type: String,
    pub condition_value: i64,
    pub points_reward: i64,
}

pub fn builtin_catalog() -> Result<SeedCatalog, serde_json::Error> {
    serde_json::from_str(SEED_CATALOG)
}

impl SqliteCatalog {
    /// Loads the built-in catalog when the categories table is empty.
    /// Returns whether anything was inserted.
    pub async fn seed_if_empty(&self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(self.pool())
            .await?;

        if existing > 0 {
            tracing::debug!("Catalog already holds {} categories, skipping seed", existing);
            return Ok(false);
        }

        let catalog = builtin_catalog()?;
        self.seed(&catalog).await?;
        Ok(true)
    }

    pub async fn seed(
        &self,
        catalog: &SeedCatalog,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool().begin().await?;
        let mut category_ids = std::collections::HashMap::new();

        for category in &catalog.categories {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO categories (name, icon, color, description) VALUES (?, ?, ?, ?) RETURNING id",
            )
            .bind(&category.name)
            .bind(&category.icon)
            .bind(&category.color)
            .bind(&category.description)
            .fetch_one(&mut *tx)
            .await?;
            category_ids.insert(category.name.as_str(), id);
        }

        let mut question_total = 0;
        for quiz in &catalog.quizzes {
            let category_id = category_ids
                .get(quiz.category.as_str())
                .copied()
                .ok_or_else(|| format!("quiz '{}' names unknown category '{}'", quiz.title, quiz.category))?;

            let quiz_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO quizzes (title, description, category_id, difficulty, time_limit, is_public)
                VALUES (?, ?, ?, ?, ?, 1)
                RETURNING id
                "#,
            )
            .bind(&quiz.title)
            .bind(&quiz.description)
            .bind(category_id)
            .bind(&quiz.difficulty)
            .bind(SEED_TIME_LIMIT)
            .fetch_one(&mut *tx)
            .await?;

            for question in &quiz.questions {
                let [a, b, c, d] = &question.options;
                sqlx::query(
                    r#"
                    INSERT INTO questions
                        (quiz_id, question_text, correct_answer, option_a, option_b, option_c, option_d, explanation)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(quiz_id)
                .bind(&question.text)
                .bind(&question.correct_answer)
                .bind(a)
                .bind(b)
                .bind(c)
                .bind(d)
                .bind(&question.explanation)
                .execute(&mut *tx)
                .await?;
            }
            question_total += quiz.questions.len();
        }

        for achievement in &catalog.achievements {
            sqlx::query(
                r#"
                INSERT INTO achievements (name, description, icon, condition_type, condition_value, points_reward)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&achievement.name)
            .bind(&achievement.description)
            .bind(&achievement.icon)
            .bind(&achievement.condition_type)
            .bind(achievement.condition_value)
            .bind(achievement.points_reward)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.recompute_category_question_counts().await?;

        tracing::info!(
            "Seeded {} categories, {} quizzes, {} questions, {} achievements",
            catalog.categories.len(),
            catalog.quizzes.len(),
            question_total,
            catalog.achievements.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_consistent() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(catalog.categories.len(), 8);
        assert_eq!(catalog.quizzes.len(), 8);
        assert_eq!(catalog.achievements.len(), 8);

        for quiz in &catalog.quizzes {
            assert!(
                catalog.categories.iter().any(|c| c.name == quiz.category),
                "{} has no category",
                quiz.title
            );
            for q in &quiz.questions {
                assert!(
                    q.options.contains(&q.correct_answer),
                    "'{}' is not answerable",
                    q.text
                );
            }
        }
    }

    #[test]
    fn science_quiz_has_more_questions_than_one_attempt_draws() {
        let catalog = builtin_catalog().unwrap();
        let science = catalog
            .quizzes
            .iter()
            .find(|q| q.title == "Science Quiz")
            .unwrap();
        assert_eq!(science.questions.len(), 15);
        assert_eq!(science.questions[0].correct_answer, "H2O");
    }
}

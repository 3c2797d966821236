// src/attempt.rs

//! Quiz attempt state machine.
//!
//! An attempt is created from a fixed random draw of a quiz's questions and
//! then lives in the owning browser session until `finish_attempt` persists
//! it. Between those two points nothing is read from the store again.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::Serialize;

use crate::{
    models::{
        game_session::CompletedAttempt,
        question::{PublicQuestion, Question},
        quiz::{QuizDetail, QuizInfo},
    },
    store::CatalogStore,
};

/// Upper bound on the number of questions drawn for one attempt.
pub const MAX_QUESTIONS_PER_ATTEMPT: usize = 10;

/// Advertised per-question time limit. The server never enforces it.
pub const QUESTION_TIME_LIMIT_SECS: u32 = 30;

/// Logged in place of an empty submission.
pub const SKIPPED_ANSWER: &str = "No answer";

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptError {
    QuizNotFound,
    NoQuestions,
    NoActiveAttempt,
    OutOfRange { index: i64, total: usize },
    Store(String),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::QuizNotFound => f.write_str("quiz not found"),
            AttemptError::NoQuestions => f.write_str("quiz has no questions"),
            AttemptError::NoActiveAttempt => f.write_str("no active attempt"),
            AttemptError::OutOfRange { index, total } => {
                write!(f, "question {index} is out of range (attempt has {total})")
            }
            AttemptError::Store(msg) => write!(f, "store error: {msg}"),
        }
    }
}

impl std::error::Error for AttemptError {}

impl From<sqlx::Error> for AttemptError {
    fn from(err: sqlx::Error) -> Self {
        AttemptError::Store(err.to_string())
    }
}

/// What the player sent for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmittedAnswer {
    /// Nothing, or an empty answer. Logged as [`SKIPPED_ANSWER`].
    Skipped,
    /// Compared exactly against the correct answer.
    Text(String),
    /// A value that is not text, logged as sent. Never correct.
    Other(String),
}

impl SubmittedAnswer {
    pub fn text(answer: impl Into<String>) -> Self {
        let answer = answer.into();
        if answer.is_empty() {
            SubmittedAnswer::Skipped
        } else {
            SubmittedAnswer::Text(answer)
        }
    }
}

/// One entry of the answer log. Entries are never rewritten.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnswerRecord {
    pub question_id: i64,
    pub answer: String,
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: String,
}

/// Returned by [`Attempt::advance`].
#[derive(Debug, Serialize)]
pub struct QuestionProgress {
    pub question: PublicQuestion,
    /// 1-based position.
    pub question_num: usize,
    pub total_questions: usize,
    pub progress: f64,
}

/// Returned by [`Attempt::submit`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmitOutcome {
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    pub score: i64,
}

/// Results bundle produced when an attempt completes.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptResults {
    pub game_session_id: i64,
    pub quiz_info: QuizInfo,
    pub score: i64,
    pub correct_answers: i64,
    pub total_questions: usize,
    pub percentage: f64,
    pub time_taken: i64,
    pub answers: Vec<AnswerRecord>,
}

/// In-progress attempt held by a browser session.
#[derive(Debug, Clone)]
pub struct Attempt {
    quiz_id: i64,
    quiz_info: QuizInfo,
    questions: Vec<Question>,
    current_question: usize,
    score: i64,
    correct_answers: i64,
    answers: Vec<AnswerRecord>,
    started_at: DateTime<Utc>,
    question_time_limit: u32,
}

/// Shuffles the pool and keeps at most [`MAX_QUESTIONS_PER_ATTEMPT`] of them:
/// a uniform sample without replacement, in random order.
pub fn draw_questions<R: Rng + ?Sized>(mut pool: Vec<Question>, rng: &mut R) -> Vec<Question> {
    pool.shuffle(rng);
    pool.truncate(MAX_QUESTIONS_PER_ATTEMPT);
    pool
}

pub fn percentage(correct_answers: i64, total_questions: usize) -> f64 {
    if total_questions == 0 {
        return 0.0;
    }
    correct_answers as f64 / total_questions as f64 * 100.0
}

impl Attempt {
    /// Starts an attempt over a random draw from `pool`.
    pub fn begin<R: Rng + ?Sized>(
        quiz: &QuizDetail,
        pool: Vec<Question>,
        rng: &mut R,
        started_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if pool.is_empty() {
            return Err(AttemptError::NoQuestions);
        }

        Ok(Attempt {
            quiz_id: quiz.quiz.id,
            quiz_info: QuizInfo::from(quiz),
            questions: draw_questions(pool, rng),
            current_question: 0,
            score: 0,
            correct_answers: 0,
            answers: Vec::new(),
            started_at,
            question_time_limit: QUESTION_TIME_LIMIT_SECS,
        })
    }

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> usize {
        self.current_question
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn correct_answers(&self) -> i64 {
        self.correct_answers
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn question_time_limit(&self) -> u32 {
        self.question_time_limit
    }

    fn question(&self, index: i64) -> Result<&Question, AttemptError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.questions.get(i))
            .ok_or(AttemptError::OutOfRange {
                index,
                total: self.questions.len(),
            })
    }

    /// Returns the question at the 0-based `index` and marks it current.
    pub fn advance(&mut self, index: usize) -> Result<QuestionProgress, AttemptError> {
        let total = self.total_questions();
        let position = i64::try_from(index).unwrap_or(i64::MAX);
        let question = PublicQuestion::from(self.question(position)?);
        self.current_question = index;

        Ok(QuestionProgress {
            question,
            question_num: index + 1,
            total_questions: total,
            progress: (index + 1) as f64 / total as f64 * 100.0,
        })
    }

    /// Scores one answer for the 0-based `index`. Skips and non-text values
    /// are always wrong. Every call appends to the answer log, including
    /// repeated submissions for the same index.
    pub fn submit(
        &mut self,
        index: i64,
        answer: SubmittedAnswer,
    ) -> Result<SubmitOutcome, AttemptError> {
        let question = self.question(index)?;

        let (correct, logged) = match answer {
            SubmittedAnswer::Skipped => (false, SKIPPED_ANSWER.to_string()),
            SubmittedAnswer::Text(text) => (question.is_correct(&text), text),
            SubmittedAnswer::Other(raw) => (false, raw),
        };
        let points = question.point_value();
        let record = AnswerRecord {
            question_id: question.id,
            answer: logged,
            correct,
            correct_answer: question.correct_answer.clone(),
            explanation: question.explanation_text(),
        };

        if correct {
            self.score += points;
            self.correct_answers += 1;
        }

        let outcome = SubmitOutcome {
            correct,
            correct_answer: record.correct_answer.clone(),
            explanation: record.explanation.clone(),
            score: self.score,
        };
        self.answers.push(record);

        Ok(outcome)
    }

    pub fn percentage(&self) -> f64 {
        percentage(self.correct_answers, self.total_questions())
    }

    /// Whole seconds since the attempt started.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }

    /// The row to persist for this attempt.
    pub fn to_record(&self, user_id: i64, now: DateTime<Utc>) -> CompletedAttempt {
        CompletedAttempt {
            user_id,
            quiz_id: self.quiz_id,
            score: self.score,
            total_questions: self.total_questions() as i64,
            correct_answers: self.correct_answers,
            time_taken: self.elapsed_secs(now),
        }
    }
}

/// Loads the quiz and its questions and starts a new attempt.
pub async fn start_attempt(
    store: &dyn CatalogStore,
    quiz_id: i64,
) -> Result<(QuizDetail, Attempt), AttemptError> {
    let quiz = store
        .get_quiz_with_category(quiz_id)
        .await?
        .ok_or(AttemptError::QuizNotFound)?;

    let pool = store.list_all_questions(quiz_id).await?;
    let pool_size = pool.len();

    let mut rng = StdRng::from_entropy();
    let attempt = Attempt::begin(&quiz, pool, &mut rng, Utc::now())?;

    tracing::info!(
        "Attempt started for quiz {} ('{}'): {} of {} questions drawn",
        quiz_id,
        quiz.quiz.title,
        attempt.total_questions(),
        pool_size
    );
    Ok((quiz, attempt))
}

/// Persists a finished attempt and builds its results bundle.
///
/// The caller has already removed the attempt from the session, so it is
/// discarded whether or not persistence succeeds.
pub async fn finish_attempt(
    store: &dyn CatalogStore,
    user_id: i64,
    attempt: Attempt,
    now: DateTime<Utc>,
) -> Result<AttemptResults, AttemptError> {
    let record = attempt.to_record(user_id, now);
    let session = store.record_completed_attempt(&record).await?;

    let results = AttemptResults {
        game_session_id: session.id,
        percentage: attempt.percentage(),
        total_questions: attempt.total_questions(),
        score: attempt.score,
        correct_answers: attempt.correct_answers,
        time_taken: record.time_taken,
        quiz_info: attempt.quiz_info,
        answers: attempt.answers,
    };

    tracing::info!(
        "Attempt completed: user={} quiz={} score={} correct={}/{} ({:.0}%) in {}s",
        user_id,
        record.quiz_id,
        results.score,
        results.correct_answers,
        results.total_questions,
        results.percentage,
        results.time_taken
    );
    Ok(results)
}

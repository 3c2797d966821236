// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::{
    attempt::{self, AttemptError, SubmittedAnswer},
    error::AppError,
    handlers::flash_redirect,
    session::{FlashLevel, Session, SessionUser},
    state::AppState,
};

const NO_DATA: &str = "No data received";
const INVALID_QUESTION_NUMBER: &str = "Invalid question number";

/// Body of `POST /quiz/submit`, read from any non-empty JSON object.
#[derive(Debug)]
pub struct SubmitAnswerRequest {
    pub answer: SubmittedAnswer,

    /// 0-based index into the attempt's questions. Defaults to 0.
    pub question_num: i64,
}

impl SubmitAnswerRequest {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, AppError> {
        if body.is_empty() {
            return Err(AppError::BadRequest(NO_DATA.to_string()));
        }

        let question_num = match body.get("question_num") {
            None => 0,
            Some(value) => value
                .as_i64()
                .ok_or_else(|| AppError::BadRequest(INVALID_QUESTION_NUMBER.to_string()))?,
        };

        Ok(Self {
            answer: submitted_answer(body.get("answer")),
            question_num,
        })
    }
}

/// Falsy JSON values count as a skip; strings are answers; anything else is
/// kept in its JSON form and can never match.
fn submitted_answer(value: Option<&Value>) -> SubmittedAnswer {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => SubmittedAnswer::Skipped,
        Some(Value::String(text)) => SubmittedAnswer::text(text.as_str()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => SubmittedAnswer::Skipped,
        Some(Value::Array(items)) if items.is_empty() => SubmittedAnswer::Skipped,
        Some(Value::Object(fields)) if fields.is_empty() => SubmittedAnswer::Skipped,
        Some(other) => SubmittedAnswer::Other(other.to_string()),
    }
}

/// Starts a new attempt for the quiz, replacing any attempt in progress.
pub async fn start_quiz(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(quiz_id): Path<i64>,
) -> Result<Response, AppError> {
    match attempt::start_attempt(state.store.as_ref(), quiz_id).await {
        Ok((quiz, attempt)) => {
            let total_questions = attempt.total_questions();
            let question_time_limit = attempt.question_time_limit();
            if session.has_attempt() {
                tracing::debug!("Session {:?} abandons its previous attempt", session.id());
            }
            session.set_attempt(attempt);

            Ok(Json(json!({
                "quiz": quiz,
                "total_questions": total_questions,
                "question_time_limit": question_time_limit,
                "messages": session.take_flashes(),
            }))
            .into_response())
        }
        Err(AttemptError::QuizNotFound) => Ok(flash_redirect(
            &session,
            FlashLevel::Danger,
            "Quiz not found",
            "/dashboard",
        )),
        Err(AttemptError::NoQuestions) => Ok(flash_redirect(
            &session,
            FlashLevel::Warning,
            "This quiz has no questions yet",
            "/dashboard",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Returns one question of the active attempt (answer withheld) with progress.
pub async fn question(
    Extension(session): Extension<Session>,
    path: Result<Path<usize>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(question_num) = path.map_err(|rejection| {
        tracing::debug!("Rejected question number: {}", rejection);
        AppError::BadRequest(INVALID_QUESTION_NUMBER.to_string())
    })?;

    let progress = session
        .with_attempt(|attempt| attempt.advance(question_num))
        .map_err(|e| match e {
            AttemptError::OutOfRange { .. } => AppError::BadRequest("Quiz completed".to_string()),
            other => other.into(),
        })?;

    Ok(Json(progress))
}

/// Scores one answer of the active attempt.
pub async fn submit_answer(
    Extension(session): Extension<Session>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    if !session.has_attempt() {
        return Err(AppError::NoActiveAttempt);
    }

    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!("Rejected answer payload: {}", rejection);
        AppError::BadRequest(NO_DATA.to_string())
    })?;
    let req = SubmitAnswerRequest::from_body(&body)?;

    let outcome = session
        .with_attempt(|attempt| attempt.submit(req.question_num, req.answer))?;

    tracing::debug!(
        "Answer for question {} processed: correct={} score={}",
        req.question_num,
        outcome.correct,
        outcome.score
    );

    Ok(Json(outcome))
}

/// Completes the active attempt and returns its results.
pub async fn results(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(user): Extension<SessionUser>,
) -> Result<Response, AppError> {
    let Some(attempt) = session.take_attempt() else {
        return Ok(flash_redirect(
            &session,
            FlashLevel::Warning,
            "No quiz session found",
            "/dashboard",
        ));
    };

    let results = attempt::finish_attempt(state.store.as_ref(), user.id, attempt, Utc::now())
        .await?;

    Ok(Json(json!({
        "results": results,
        "messages": session.take_flashes(),
    }))
    .into_response())
}

/// Redirects to a uniformly random quiz.
pub async fn random_quiz(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    match state.store.pick_random_quiz_id().await? {
        Some(quiz_id) => Ok(Redirect::to(&format!("/quiz/{quiz_id}")).into_response()),
        None => Ok(flash_redirect(
            &session,
            FlashLevel::Warning,
            "No quizzes available",
            "/dashboard",
        )),
    }
}

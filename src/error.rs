// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::attempt::AttemptError;

pub const NO_ACTIVE_ATTEMPT: &str = "No active quiz session. Please start a new quiz.";

/// Application-wide error type.
///
/// JSON endpoints return it directly; page handlers usually turn the
/// recoverable variants into a flash message plus a redirect instead.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (malformed input, out-of-range index)
    BadRequest(String),

    // 400 Bad Request, JSON quiz endpoints called without an attempt
    NoActiveAttempt,

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(msg) => write!(f, "internal error: {msg}"),
            AppError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            AppError::NoActiveAttempt => f.write_str(NO_ACTIVE_ATTEMPT),
            AppError::AuthError(msg) => write!(f, "unauthorized: {msg}"),
            AppError::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON `{ "error": ... }` body with the matching status code.
/// Internal failures are logged; the client only sees a generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NoActiveAttempt => (StatusCode::BAD_REQUEST, NO_ACTIVE_ATTEMPT.to_string()),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<AttemptError> for AppError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::QuizNotFound => AppError::NotFound("Quiz not found".to_string()),
            AttemptError::NoQuestions => {
                AppError::NotFound("This quiz has no questions yet".to_string())
            }
            AttemptError::NoActiveAttempt => AppError::NoActiveAttempt,
            AttemptError::OutOfRange { .. } => {
                AppError::BadRequest("Invalid question number".to_string())
            }
            AttemptError::Store(msg) => AppError::InternalServerError(msg),
        }
    }
}

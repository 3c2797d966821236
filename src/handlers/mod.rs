// src/handlers/mod.rs

pub mod auth;
pub mod pages;
pub mod quiz;

use axum::response::{IntoResponse, Redirect, Response};

use crate::session::{FlashLevel, Session};

/// Queues a flash message and redirects (303 See Other) to `to`.
pub fn flash_redirect(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
    to: &str,
) -> Response {
    session.flash(level, message);
    Redirect::to(to).into_response()
}

// src/handlers/pages.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::{
    error::AppError,
    handlers::flash_redirect,
    session::{FlashLevel, Session, SessionUser},
    state::AppState,
};

/// How many completed attempts the dashboard lists.
const RECENT_GAMES_LIMIT: i64 = 5;

/// Landing page, or the dashboard for signed-in users.
pub async fn index(Extension(session): Extension<Session>) -> Response {
    if session.user().is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    Json(json!({
        "app": "QuizMaster Pro",
        "messages": session.take_flashes(),
    }))
    .into_response()
}

/// The login/registration page.
pub async fn auth_page(Extension(session): Extension<Session>) -> impl IntoResponse {
    Json(json!({
        "signed_in": session.user().is_some(),
        "messages": session.take_flashes(),
    }))
}

pub async fn logout(Extension(session): Extension<Session>) -> Response {
    if let Some(user) = session.user() {
        tracing::info!("User {} logged out", user.id);
    }
    session.clear();
    flash_redirect(&session, FlashLevel::Success, "Logged out successfully", "/")
}

/// User stats, recent attempts, categories and achievements.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(user): Extension<SessionUser>,
) -> Result<Response, AppError> {
    let Some(profile) = state.store.get_user(user.id).await? else {
        // Account removed while the session was alive.
        tracing::warn!("Session {:?} refers to missing user {}", session.id(), user.id);
        session.clear();
        return Ok(flash_redirect(
            &session,
            FlashLevel::Warning,
            "Please login to access this feature",
            "/auth",
        ));
    };

    let recent_games = state.store.recent_games(user.id, RECENT_GAMES_LIMIT).await?;
    let categories = state.store.list_categories_with_quiz_counts().await?;
    let achievements = state.store.achievements_for_user(user.id).await?;

    Ok(Json(json!({
        "user": profile,
        "recent_games": recent_games,
        "categories": categories,
        "achievements": achievements,
        "messages": session.take_flashes(),
    }))
    .into_response())
}

/// Quizzes of one category, newest first.
pub async fn category_quizzes(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(category_name): Path<String>,
) -> Result<Response, AppError> {
    let Some(category) = state.store.get_category_by_name(&category_name).await? else {
        return Ok(flash_redirect(
            &session,
            FlashLevel::Danger,
            "Category not found",
            "/dashboard",
        ));
    };

    let quizzes = state.store.list_quizzes_in_category(category.id).await?;

    Ok(Json(json!({
        "category": category,
        "quizzes": quizzes,
        "messages": session.take_flashes(),
    }))
    .into_response())
}

/// Row counts of the catalog tables, for a quick health check.
pub async fn catalog_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let counts = state.store.catalog_counts().await?;
    Ok(Json(counts))
}

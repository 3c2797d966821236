// src/routes.rs

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{auth, pages, quiz},
    state::AppState,
    utils::jwt::{require_login, session_middleware},
};

/// Assembles the main application router.
///
/// * Public pages: landing, auth, logout, catalog stats.
/// * Everything else requires a signed-in session.
/// * Every request passes through the session middleware (inside the trace layer).
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::index))
        .route("/auth", get(pages::auth_page).post(auth::submit))
        .route("/logout", get(pages::logout))
        .route("/stats", get(pages::catalog_stats));

    let quiz_routes = Router::new()
        .route("/{quiz_id}", get(quiz::start_quiz))
        .route("/question/{question_num}", get(quiz::question))
        .route("/submit", post(quiz::submit_answer))
        .route("/results", get(quiz::results));

    let protected_routes = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/category/{category_name}", get(pages::category_quizzes))
        .route("/random-quiz", get(quiz::random_quiz))
        .nest("/quiz", quiz_routes)
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global Middleware (the last layer added runs first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

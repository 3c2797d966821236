// src/handlers/auth.rs

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::flash_redirect,
    models::user::{AuthForm, LoginRequest, RegisterRequest},
    session::{FlashLevel, Session, SessionUser},
    state::AppState,
    utils::hash::{hash_password, verify_password},
};

const DUPLICATE_USER: &str = "Username or email already exists";
const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Handles the `/auth` form: `action=register` or `action=login`.
pub async fn submit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<AuthForm>,
) -> Result<Response, AppError> {
    match form.action.as_deref() {
        Some("register") => match form.registration() {
            Some(req) => register(&state, &session, req).await,
            None => Ok(flash_redirect(
                &session,
                FlashLevel::Danger,
                "All fields are required",
                "/auth",
            )),
        },
        Some("login") => login(&state, &session, form.login()).await,
        other => {
            tracing::debug!("Ignoring auth form with action {:?}", other);
            Ok(Redirect::to("/auth").into_response())
        }
    }
}

/// Registers a new user and signs them in.
///
/// Hashes the password using Argon2 before storing it.
/// Duplicate usernames or emails are reported as a flash, without signing in.
async fn register(
    state: &AppState,
    session: &Session,
    req: RegisterRequest,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = req.validate() {
        tracing::debug!("Registration rejected: {}", validation_errors);
        let message = first_validation_message(&validation_errors)
            .unwrap_or_else(|| validation_errors.to_string());
        return Ok(flash_redirect(session, FlashLevel::Danger, message, "/auth"));
    }

    if state.store.user_exists(&req.username, &req.email).await? {
        return Ok(flash_redirect(session, FlashLevel::Danger, DUPLICATE_USER, "/auth"));
    }

    let hashed_password = hash_password(&req.password)?;

    let user = match state
        .store
        .create_user(&req.username, &req.email, &hashed_password)
        .await
    {
        Ok(user) => user,
        // Lost a race against a concurrent registration.
        Err(e) if is_unique_violation(&e) => {
            return Ok(flash_redirect(session, FlashLevel::Danger, DUPLICATE_USER, "/auth"));
        }
        Err(e) => {
            tracing::error!("Failed to register user: {:?}", e);
            return Err(AppError::from(e));
        }
    };

    tracing::info!("Registered user {} ({})", user.username, user.id);
    session.sign_in(SessionUser {
        id: user.id,
        username: user.username.clone(),
    });

    Ok(flash_redirect(
        session,
        FlashLevel::Success,
        format!("Welcome to QuizMaster Pro, {}!", user.username),
        "/dashboard",
    ))
}

/// Authenticates a user against the stored Argon2 hash.
async fn login(
    state: &AppState,
    session: &Session,
    req: LoginRequest,
) -> Result<Response, AppError> {
    if req.validate().is_err() {
        return Ok(flash_redirect(session, FlashLevel::Danger, BAD_CREDENTIALS, "/auth"));
    }

    let user = state.store.find_user_by_username(&req.username).await?;

    match user {
        Some(user) if verify_password(&req.password, &user.password) => {
            tracing::info!("User {} logged in", user.id);
            session.sign_in(SessionUser {
                id: user.id,
                username: user.username.clone(),
            });
            Ok(flash_redirect(
                session,
                FlashLevel::Success,
                format!("Welcome back, {}!", user.username),
                "/dashboard",
            ))
        }
        _ => Ok(flash_redirect(session, FlashLevel::Danger, BAD_CREDENTIALS, "/auth")),
    }
}

fn first_validation_message(errors: &validator::ValidationErrors) -> Option<String> {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

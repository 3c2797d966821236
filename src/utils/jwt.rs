// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Extension,
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    session::{FlashLevel, Session},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "quizmaster_session";

/// Claims of the session cookie token.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionClaims {
    /// Server-side session id.
    pub sid: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a session cookie token for `session_id`.
pub fn sign_session_token(
    session_id: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = SessionClaims {
        sid: session_id.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies a session cookie token and returns the session id it carries.
pub fn verify_session_token(token: &str, secret: &str) -> Result<String, AppError> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid session token".to_string()))?;

    Ok(token_data.claims.sid)
}

/// Browser-session cookie; expiry is carried by the token's `exp` claim.
fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Axum Middleware: Session.
///
/// Resolves the session named by the signed cookie. A missing, invalid or
/// expired cookie, or one naming a forgotten session, leaves the request
/// without a session until a handler writes to it. Injects a [`Session`]
/// handle into the request extensions and, once the handler is done, issues
/// or removes the cookie if the session id changed.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let presented = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| verify_session_token(cookie.value(), &state.config.session_secret).ok())
        .filter(|sid| state.sessions.touch(sid));

    let session = state.sessions.session(presented.clone());
    req.extensions_mut().insert(session.clone());
    let response = next.run(req).await;

    let current = session.id();
    if current == presented {
        return response;
    }

    let Some(session_id) = current else {
        let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
        return (jar, response).into_response();
    };

    match sign_session_token(
        &session_id,
        &state.config.session_secret,
        state.config.session_ttl,
    ) {
        Ok(token) => {
            let jar = jar.add(session_cookie(token));
            (jar, response).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to sign session cookie: {}", e);
            response
        }
    }
}

/// Axum Middleware: Login required.
///
/// Must be used AFTER `session_middleware`. Without a signed-in user the
/// request is answered with a flash message and a redirect to `/auth`;
/// otherwise the `SessionUser` is injected for handlers to use.
pub async fn require_login(
    Extension(session): Extension<Session>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match session.user() {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => {
            session.flash(FlashLevel::Warning, "Please login to access this feature");
            Redirect::to("/auth").into_response()
        }
    }
}

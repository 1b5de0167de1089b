//! Authentication API handlers.
//!
//! Registration and login come in two flavours. The `_session` routes return
//! an opaque token stored server-side; the `_JWT` routes return a signed token
//! that is never stored. Both are presented the same way afterwards:
//!
//! ```bash
//! curl -X POST http://localhost:8080/register_session \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Ann", "email": "a@x.com", "password": "secret1"}'
//!
//! curl http://localhost:8080/api/todos -H "Authorization: Bearer <token>"
//! ```

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use todoex::auth::{AuthError, LoginRequest, RegisterRequest};

use super::{AppState, error::ApiError, middleware::AuthenticatedUser};
use crate::logging::log_auth_failure;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

type Created = (StatusCode, Json<TokenResponse>);

fn created(token: String) -> Created {
    (StatusCode::CREATED, Json(TokenResponse { token }))
}

fn note_login_failure(err: &AuthError) {
    if matches!(err, AuthError::InvalidCredentials) {
        log_auth_failure("failed_login", None, "invalid email or password");
    }
}

/// Register a user and open a session in one atomic step.
///
/// # Response
///
/// `201 Created` with `{"token": "<128 hex chars>"}`.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, missing field, short password, email taken
/// - `500 Internal Server Error`: Storage failure
pub async fn register_session(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Created, ApiError> {
    let Json(request) = payload?;
    let token = state.sessions.register_with_session(request).await?;
    Ok(created(token))
}

/// Register a user and return a signed token valid for 24 hours.
pub async fn register_jwt(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Created, ApiError> {
    let Json(request) = payload?;
    let token = state.sessions.register_with_token(request).await?;
    Ok(created(token))
}

/// Log in and open an additional session. Earlier sessions stay valid.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `401 Unauthorized`: Unknown email or wrong password, indistinguishably
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Created, ApiError> {
    let Json(request) = payload?;
    let token = state
        .sessions
        .login_with_session(request)
        .await
        .inspect_err(note_login_failure)?;
    Ok(created(token))
}

/// Log in and receive a signed token. Nothing is stored.
pub async fn login_jwt(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Created, ApiError> {
    let Json(request) = payload?;
    let token = state
        .sessions
        .login_with_token(request)
        .await
        .inspect_err(note_login_failure)?;
    Ok(created(token))
}

/// Delete the session the request was authenticated with.
///
/// A signed token has no session row, so presenting one here fails with 401.
pub async fn logout(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = caller.user_id();

    state
        .sessions
        .logout(user_id, &caller.token)
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::ForeignSession) {
                log_auth_failure("foreign_logout", Some(user_id), &e.to_string());
            }
        })?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

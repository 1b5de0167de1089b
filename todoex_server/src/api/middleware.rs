//! Authentication gate for protected endpoints.
//!
//! The gate extracts the bearer token from the `Authorization` header,
//! resolves it to an [`Identity`] through the session manager, and injects an
//! [`AuthenticatedUser`] into request extensions for downstream handlers.
//! Opaque session tokens and signed tokens are both accepted; the session
//! manager picks the verifier by token shape.
//!
//! # Extracting the identity
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use todoex_server::api::middleware::AuthenticatedUser;
//!
//! async fn protected_handler(Extension(caller): Extension<AuthenticatedUser>) -> String {
//!     format!("Authenticated as {}", caller.identity.user.email)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use todoex::{
    ErrorClass,
    auth::{Identity, UserId},
};

use super::{AppState, error::ApiError};
use crate::logging::log_auth_failure;

/// Caller identity attached to every request that passed the gate.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub identity: Identity,
    /// The bearer token exactly as presented
    pub token: String,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> UserId {
        self.identity.user_id()
    }
}

/// Extract the credential from an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication gate.
///
/// # Behavior
///
/// - **No header**: `401 Unauthorized`
/// - **No `Bearer ` prefix or empty token**: `401 Unauthorized`
/// - **Unknown, expired or invalid credential**: `401 Unauthorized`
/// - **Credential valid but user archived or absent**: `404 Not Found`
/// - **Store failure**: `500 Internal Server Error`
/// - **Success**: injects [`AuthenticatedUser`] and calls the next handler
pub async fn auth_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(ApiError::Unauthorized("Missing authorization header"))?;

    let token = header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or(ApiError::Unauthorized("Malformed authorization header"))?
        .to_string();

    let identity = match state.sessions.authenticate(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            if e.class() != ErrorClass::Internal {
                log_auth_failure("rejected_credential", None, &e.to_string());
            }
            return Err(e.into());
        }
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { identity, token });

    Ok(next.run(request).await)
}

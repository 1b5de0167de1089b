//! Authentication error types.

use thiserror::Error;

use crate::errors::ErrorClass;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Stored password hash could not be parsed
    #[error("Stored password hash is malformed")]
    MalformedHash,

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email already belongs to an active user
    #[error("User already exists")]
    EmailTaken,

    /// Required field missing or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid email format
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// Session token unknown or past its expiry
    #[error("Invalid or expired session token")]
    InvalidOrExpiredSession,

    /// Session token belongs to a different user
    #[error("Invalid session token")]
    ForeignSession,

    /// Logout without a session token
    #[error("Missing session token")]
    MissingSessionToken,

    /// Signed token failed signature or structure checks
    #[error("Invalid token")]
    InvalidToken,

    /// Signed token is past its expiry claim
    #[error("Token expired")]
    TokenExpired,

    /// Signed token could not be produced
    #[error("Token encoding failed: {0}")]
    TokenEncoding(jsonwebtoken::errors::Error),

    /// User not found or archived
    #[error("User does not exist")]
    UserNotFound,

    /// Freshly minted session token already exists
    #[error("Session token collision")]
    SessionTokenCollision,
}

impl AuthError {
    /// Classify this error for transport mapping.
    pub fn class(&self) -> ErrorClass {
        match self {
            AuthError::MissingField(_)
            | AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::MissingSessionToken => ErrorClass::Validation,
            AuthError::InvalidCredentials
            | AuthError::InvalidOrExpiredSession
            | AuthError::ForeignSession
            | AuthError::InvalidToken
            | AuthError::TokenExpired => ErrorClass::Authentication,
            AuthError::UserNotFound => ErrorClass::NotFound,
            AuthError::EmailTaken => ErrorClass::Conflict,
            AuthError::Database(_)
            | AuthError::HashingFailed
            | AuthError::MalformedHash
            | AuthError::TokenEncoding(_)
            | AuthError::SessionTokenCollision => ErrorClass::Internal,
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Internal errors are collapsed into a generic message so that SQL,
    /// hashing and encoding details never reach the client.
    pub fn client_message(&self) -> String {
        if self.class().is_client_safe() {
            self.to_string()
        } else {
            "Internal server error".to_string()
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

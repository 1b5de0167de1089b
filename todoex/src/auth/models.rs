//! Authentication data models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User ID type
pub type UserId = Uuid;

/// Lifetime of an opaque session token. Never extended after issuance.
pub const SESSION_TTL: Duration = Duration::hours(120);

/// Lifetime of a signed token.
pub const SIGNED_TOKEN_TTL: Duration = Duration::hours(24);

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl User {
    /// Archived users are treated as nonexistent.
    pub fn is_active(&self) -> bool {
        self.archived_at.is_none()
    }
}

/// Server-side session row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: UserId,
    pub session_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UserSession {
    /// Build a session issued at `created_at` with the fixed TTL.
    pub fn issue(user_id: UserId, session_token: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            session_token,
            created_at,
            expires_at: created_at + SESSION_TTL,
        }
    }

    /// A session is valid strictly before its expiry instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signed token claims.
///
/// Wire names follow the established token format: `userID` and `expiry`
/// (unix seconds).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub expiry: i64,
}

/// Which credential scheme a bearer token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Server-side session row looked up by token
    OpaqueSession,
    /// Stateless signed token
    SignedToken,
}

impl CredentialKind {
    /// Classify a bearer token by shape.
    ///
    /// Signed tokens are three non-empty dot-separated segments; session
    /// tokens are hex and never contain a dot.
    pub fn classify(token: &str) -> Self {
        let mut segments = token.split('.');
        let three_parts = segments.by_ref().take(3).filter(|s| !s.is_empty()).count() == 3;
        if three_parts && segments.next().is_none() {
            CredentialKind::SignedToken
        } else {
            CredentialKind::OpaqueSession
        }
    }
}

/// A resolved, normalized caller identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub kind: CredentialKind,
}

impl Identity {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}

//! Authentication module providing user registration, login, and session management.
//!
//! This module implements two interchangeable credential schemes:
//! - Opaque session tokens stored server-side with a fixed 120 hour lifetime
//! - HS256 signed tokens carrying `{userID, expiry}`, valid for 24 hours
//!
//! Passwords are hashed with Argon2id. Users and sessions are persisted only
//! through a [`CredentialStore`], either [`PgCredentialStore`] or the
//! in-process [`MemoryCredentialStore`].
//!
//! ## Example
//!
//! ```no_run
//! use todoex::auth::{
//!     LoginRequest, PasswordHasher, PgCredentialStore, SessionManager, TokenIssuer,
//! };
//! use todoex::db::{Database, DatabaseConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::default()).await?;
//!     let hasher = PasswordHasher::default();
//!     let store = Arc::new(PgCredentialStore::new(db.pool().clone(), hasher.clone()));
//!     let sessions = SessionManager::new(store, hasher, TokenIssuer::new(b"jwt_secret"));
//!
//!     let token = sessions
//!         .login_with_token(LoginRequest {
//!             email: "ann@example.com".to_string(),
//!             password: "secret1".to_string(),
//!         })
//!         .await?;
//!     println!("Signed token: {token}");
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod jwt;
pub mod manager;
pub mod memory;
pub mod models;
pub mod password;
pub mod store;
pub mod verifier;

pub use errors::{AuthError, AuthResult};
pub use jwt::TokenIssuer;
pub use manager::SessionManager;
pub use memory::MemoryCredentialStore;
pub use models::{
    CredentialKind, Identity, LoginRequest, RegisterRequest, SESSION_TTL, SIGNED_TOKEN_TTL,
    TokenClaims, User, UserId, UserSession,
};
pub use password::{PasswordHasher, digest, mint_session_token};
pub use store::{CredentialStore, PgCredentialStore};
pub use verifier::{CredentialVerifier, OpaqueSessionVerifier, SignedTokenVerifier};

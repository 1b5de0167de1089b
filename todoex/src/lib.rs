//! # todoex
//!
//! Domain core for a todo-list service with per-user task ownership.
//!
//! Users register and log in through one of two credential schemes:
//!
//! - **Opaque session tokens**: random hex tokens stored server-side with a
//!   fixed 120 hour lifetime, revocable at logout.
//! - **Signed tokens (JWT)**: stateless HMAC-signed assertions carrying the
//!   user id and a 24 hour expiry, never stored.
//!
//! Both schemes resolve to the same [`auth::Identity`], which every todo
//! operation takes as a mandatory ownership filter.
//!
//! ## Core Modules
//!
//! - [`auth`]: credential store contract, password hashing, token issuance,
//!   session manager
//! - [`todo`]: owned todo items and their repository
//! - [`db`]: PostgreSQL pool, configuration and migrations
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use todoex::auth::{
//!     MemoryCredentialStore, PasswordHasher, RegisterRequest, SessionManager, TokenIssuer,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), todoex::auth::AuthError> {
//! let hasher = PasswordHasher::default();
//! let store = Arc::new(MemoryCredentialStore::new(hasher.clone()));
//! let manager = SessionManager::new(store, hasher, TokenIssuer::new(b"change-me"));
//!
//! let token = manager
//!     .register_with_session(RegisterRequest {
//!         name: "Ann".to_string(),
//!         email: "a@x.com".to_string(),
//!         password: "secret1".to_string(),
//!     })
//!     .await?;
//!
//! let identity = manager.authenticate(&token).await?;
//! assert_eq!(identity.user.email, "a@x.com");
//! # Ok(())
//! # }
//! ```

/// Users, sessions, signed tokens and the session manager.
pub mod auth;

/// PostgreSQL connection pooling and migrations.
pub mod db;

/// Error classification shared by every domain error.
pub mod errors;

/// Owned todo items.
pub mod todo;

pub use errors::ErrorClass;

//! In-memory `CredentialStore`.
//!
//! Backs tests and local runs without PostgreSQL. Uniqueness and expiry are
//! enforced with the same predicates the SQL implementation uses, and every
//! operation runs under a single lock so multi-row writes are atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    errors::{AuthError, AuthResult},
    models::{User, UserId, UserSession},
    password::PasswordHasher,
    store::{CredentialStore, check_login},
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    sessions: HashMap<String, UserSession>,
}

impl State {
    fn active_user_by_email(&self, email: &str) -> Option<&User> {
        let email = email.to_lowercase();
        self.users
            .values()
            .find(|u| u.is_active() && u.email.to_lowercase() == email)
    }

    fn insert_user(&mut self, name: &str, email: &str, password_hash: &str) -> AuthResult<UserId> {
        if self.active_user_by_email(email).is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            created_at: Utc::now(),
            archived_at: None,
        };
        let id = user.id;
        self.users.insert(id, user);
        Ok(id)
    }

    fn insert_session(&mut self, user_id: UserId, session_token: &str) -> AuthResult<()> {
        if self.sessions.contains_key(session_token) {
            return Err(AuthError::SessionTokenCollision);
        }

        let session = UserSession::issue(user_id, session_token.to_string(), Utc::now());
        self.sessions.insert(session_token.to_string(), session);
        Ok(())
    }
}

/// Credential store held entirely in process memory.
pub struct MemoryCredentialStore {
    state: RwLock<State>,
    hasher: PasswordHasher,
}

impl MemoryCredentialStore {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self {
            state: RwLock::new(State::default()),
            hasher,
        }
    }

    /// Move a session's expiry to now, as if its TTL had elapsed. The row stays.
    pub async fn expire_session(&self, session_token: &str) -> bool {
        let mut state = self.state.write().await;
        match state.sessions.get_mut(session_token) {
            Some(session) => {
                session.expires_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Number of stored session rows, expired ones included.
    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    /// Number of stored user rows, archived ones included.
    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn user_exists(&self, email: &str) -> AuthResult<bool> {
        Ok(self.state.read().await.active_user_by_email(email).is_some())
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AuthResult<UserId> {
        self.state
            .write()
            .await
            .insert_user(name, email, password_hash)
    }

    async fn create_user_with_session(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        session_token: &str,
    ) -> AuthResult<UserId> {
        let mut state = self.state.write().await;
        if state.sessions.contains_key(session_token) {
            return Err(AuthError::SessionTokenCollision);
        }

        let user_id = state.insert_user(name, email, password_hash)?;
        state.insert_session(user_id, session_token)?;
        Ok(user_id)
    }

    async fn create_session(&self, user_id: UserId, session_token: &str) -> AuthResult<()> {
        self.state
            .write()
            .await
            .insert_session(user_id, session_token)
    }

    async fn find_user_id_by_password(&self, email: &str, password: &str) -> AuthResult<UserId> {
        let found = self
            .state
            .read()
            .await
            .active_user_by_email(email)
            .map(|u| (u.id, u.password.clone()));

        check_login(&self.hasher, found, password)
    }

    async fn find_user_id_by_session(&self, session_token: &str) -> AuthResult<UserId> {
        let now = Utc::now();
        self.state
            .read()
            .await
            .sessions
            .get(session_token)
            .filter(|s| s.is_valid_at(now))
            .map(|s| s.user_id)
            .ok_or(AuthError::InvalidOrExpiredSession)
    }

    async fn find_user_by_id(&self, user_id: UserId) -> AuthResult<User> {
        self.state
            .read()
            .await
            .users
            .get(&user_id)
            .filter(|u| u.is_active())
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }

    async fn delete_session(&self, session_token: &str) -> AuthResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .sessions
            .remove(session_token)
            .is_some())
    }

    async fn archive_user(&self, user_id: UserId) -> AuthResult<bool> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&user_id) {
            Some(user) if user.is_active() => {
                user.archived_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

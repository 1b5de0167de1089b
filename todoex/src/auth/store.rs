//! Credential store contract and its PostgreSQL implementation.
//!
//! The store exclusively owns persistence of users and sessions. The session
//! manager and the auth gate reach storage only through [`CredentialStore`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::{
    errors::{AuthError, AuthResult},
    models::{User, UserId, UserSession},
    password::PasswordHasher,
};

/// Name of the unique index enforcing case-insensitive email uniqueness
/// among active users.
pub const ACTIVE_EMAIL_INDEX: &str = "users_active_email_idx";

/// Unique constraint on `user_sessions.session_token`.
pub const SESSION_TOKEN_KEY: &str = "user_sessions_session_token_key";

/// Trait for user and session persistence.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Whether an active user owns `email` (case-insensitive).
    async fn user_exists(&self, email: &str) -> AuthResult<bool>;

    /// Create a user and return its fresh id.
    ///
    /// # Errors
    ///
    /// * `AuthError::EmailTaken` - An active user already owns the email.
    ///   Reported from the store's uniqueness constraint, so it also covers
    ///   races that slipped past [`user_exists`](Self::user_exists).
    async fn create_user(&self, name: &str, email: &str, password_hash: &str)
    -> AuthResult<UserId>;

    /// Create a user and its first session as one atomic unit.
    ///
    /// Either both rows exist afterwards or neither does.
    async fn create_user_with_session(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        session_token: &str,
    ) -> AuthResult<UserId>;

    /// Insert a session expiring `SESSION_TTL` from now.
    async fn create_session(&self, user_id: UserId, session_token: &str) -> AuthResult<()>;

    /// Verify `password` for the active user owning `email`.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password, indistinguishably
    async fn find_user_id_by_password(&self, email: &str, password: &str) -> AuthResult<UserId>;

    /// Resolve an unexpired session token to its user.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidOrExpiredSession` - Unknown token or `expires_at <= now`
    async fn find_user_id_by_session(&self, session_token: &str) -> AuthResult<UserId>;

    /// Fetch an active user.
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - Absent or archived
    async fn find_user_by_id(&self, user_id: UserId) -> AuthResult<User>;

    /// Delete exactly the session with this token. Returns whether a row was removed.
    async fn delete_session(&self, session_token: &str) -> AuthResult<bool>;

    /// Soft-delete a user. Returns whether an active user was archived.
    async fn archive_user(&self, user_id: UserId) -> AuthResult<bool>;
}

/// Shared login check: a missing user and a wrong password fail identically.
pub(crate) fn check_login(
    hasher: &PasswordHasher,
    found: Option<(UserId, String)>,
    password: &str,
) -> AuthResult<UserId> {
    let (user_id, password_hash) = found.ok_or(AuthError::InvalidCredentials)?;

    if hasher.verify(password, &password_hash)? {
        Ok(user_id)
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// Map unique violations to their domain meaning.
fn map_insert_error(err: sqlx::Error) -> AuthError {
    let constraint = err
        .as_database_error()
        .filter(|db_err| db_err.is_unique_violation())
        .and_then(|db_err| db_err.constraint().map(str::to_owned));

    match constraint.as_deref() {
        Some(ACTIVE_EMAIL_INDEX) => AuthError::EmailTaken,
        Some(SESSION_TOKEN_KEY) => AuthError::SessionTokenCollision,
        _ => AuthError::Database(err),
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password: row.get("password"),
        created_at: row.get("created_at"),
        archived_at: row.get("archived_at"),
    }
}

/// Default PostgreSQL implementation of `CredentialStore`
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
    hasher: PasswordHasher,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool, hasher: PasswordHasher) -> Self {
        Self { pool, hasher }
    }

    async fn insert_user<'e, E>(
        executor: E,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AuthResult<UserId>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, name, email, password, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(executor)
        .await
        .map_err(map_insert_error)?;

        Ok(id)
    }

    async fn insert_session<'e, E>(
        executor: E,
        user_id: UserId,
        session_token: &str,
    ) -> AuthResult<()>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let session = UserSession::issue(user_id, session_token.to_string(), Utc::now());
        sqlx::query(
            r#"
            INSERT INTO user_sessions (id, user_id, session_token, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.session_token)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(executor)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn user_exists(&self, email: &str) -> AuthResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM users WHERE LOWER(email) = LOWER($1) AND archived_at IS NULL",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AuthResult<UserId> {
        Self::insert_user(&self.pool, name, email, password_hash).await
    }

    async fn create_user_with_session(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        session_token: &str,
    ) -> AuthResult<UserId> {
        // Dropping `tx` on any early return rolls both inserts back.
        let mut tx = self.pool.begin().await?;
        let user_id = Self::insert_user(&mut *tx, name, email, password_hash).await?;
        Self::insert_session(&mut *tx, user_id, session_token).await?;
        tx.commit().await?;

        Ok(user_id)
    }

    async fn create_session(&self, user_id: UserId, session_token: &str) -> AuthResult<()> {
        Self::insert_session(&self.pool, user_id, session_token).await
    }

    async fn find_user_id_by_password(&self, email: &str, password: &str) -> AuthResult<UserId> {
        let found = sqlx::query(
            r#"
            SELECT id, password FROM users
            WHERE LOWER(email) = LOWER($1) AND archived_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| (row.get::<UserId, _>("id"), row.get::<String, _>("password")));

        check_login(&self.hasher, found, password)
    }

    async fn find_user_id_by_session(&self, session_token: &str) -> AuthResult<UserId> {
        sqlx::query(
            r#"
            SELECT user_id FROM user_sessions
            WHERE session_token = $1 AND expires_at > NOW()
            "#,
        )
        .bind(session_token)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| row.get::<UserId, _>("user_id"))
        .ok_or(AuthError::InvalidOrExpiredSession)
    }

    async fn find_user_by_id(&self, user_id: UserId) -> AuthResult<User> {
        sqlx::query(
            r#"
            SELECT id, name, email, password, created_at, archived_at FROM users
            WHERE id = $1 AND archived_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(|row| user_from_row(&row))
        .ok_or(AuthError::UserNotFound)
    }

    async fn delete_session(&self, session_token: &str) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE session_token = $1")
            .bind(session_token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn archive_user(&self, user_id: UserId) -> AuthResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET archived_at = NOW() WHERE id = $1 AND archived_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

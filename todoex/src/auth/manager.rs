//! Session manager implementation.

use std::sync::Arc;

use tracing::{debug, info};

use super::{
    errors::{AuthError, AuthResult},
    jwt::TokenIssuer,
    models::{CredentialKind, Identity, LoginRequest, RegisterRequest, UserId},
    password::{PasswordHasher, mint_session_token},
    store::CredentialStore,
    verifier::{CredentialVerifier, OpaqueSessionVerifier, SignedTokenVerifier},
};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Session manager
///
/// Orchestrates registration and login in both credential modes and resolves
/// bearer tokens to identities. All persistence goes through the injected
/// [`CredentialStore`].
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    sessions: OpaqueSessionVerifier,
    signed: SignedTokenVerifier,
}

impl SessionManager {
    /// Create a new session manager
    ///
    /// # Arguments
    ///
    /// * `store` - Credential store for users and sessions
    /// * `hasher` - Password hasher
    /// * `issuer` - Signed token issuer holding the server secret
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, issuer: TokenIssuer) -> Self {
        Self {
            sessions: OpaqueSessionVerifier::new(store.clone()),
            signed: SignedTokenVerifier::new(issuer.clone()),
            store,
            hasher,
            issuer,
        }
    }

    /// Register a user and open a session atomically.
    ///
    /// # Returns
    ///
    /// * `AuthResult<String>` - Opaque session token
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingField` / `InvalidEmail` / `WeakPassword` - Invalid input
    /// * `AuthError::EmailTaken` - An active user already owns the email
    pub async fn register_with_session(&self, mut request: RegisterRequest) -> AuthResult<String> {
        let password_hash = self.prepare_registration(&mut request).await?;
        let token = mint_session_token(&request.email);

        let user_id = self
            .store
            .create_user_with_session(&request.name, &request.email, &password_hash, &token)
            .await?;

        info!(%user_id, "registered user with session");
        Ok(token)
    }

    /// Register a user and issue a signed token.
    ///
    /// The user row is written on its own; the token is minted afterwards and
    /// never touches storage.
    pub async fn register_with_token(&self, mut request: RegisterRequest) -> AuthResult<String> {
        let password_hash = self.prepare_registration(&mut request).await?;

        let user_id = self
            .store
            .create_user(&request.name, &request.email, &password_hash)
            .await?;

        info!(%user_id, "registered user with signed token");
        self.issuer.issue(user_id)
    }

    /// Verify credentials and open a new session.
    ///
    /// Existing sessions of the user stay valid.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password
    pub async fn login_with_session(&self, request: LoginRequest) -> AuthResult<String> {
        let email = request.email.trim();
        let user_id = self
            .store
            .find_user_id_by_password(email, &request.password)
            .await?;

        let token = mint_session_token(email);
        self.store.create_session(user_id, &token).await?;

        debug!(%user_id, "opened session");
        Ok(token)
    }

    /// Verify credentials and issue a signed token. Nothing is stored.
    pub async fn login_with_token(&self, request: LoginRequest) -> AuthResult<String> {
        let user_id = self
            .store
            .find_user_id_by_password(request.email.trim(), &request.password)
            .await?;

        self.issuer.issue(user_id)
    }

    /// Close the session identified by `session_token`.
    ///
    /// The token must belong to `user_id`, the identity already resolved by
    /// the gate.
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingSessionToken` - Empty token
    /// * `AuthError::InvalidOrExpiredSession` - Unknown, expired or already removed
    /// * `AuthError::ForeignSession` - Token belongs to another user
    pub async fn logout(&self, user_id: UserId, session_token: &str) -> AuthResult<()> {
        if session_token.is_empty() {
            return Err(AuthError::MissingSessionToken);
        }

        let owner = self.store.find_user_id_by_session(session_token).await?;
        if owner != user_id {
            return Err(AuthError::ForeignSession);
        }

        if !self.store.delete_session(session_token).await? {
            return Err(AuthError::InvalidOrExpiredSession);
        }

        debug!(%user_id, "closed session");
        Ok(())
    }

    /// Resolve a bearer token of either scheme to an active user.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidOrExpiredSession` / `InvalidToken` / `TokenExpired` - Credential rejected
    /// * `AuthError::UserNotFound` - Credential valid but the user is absent or archived
    pub async fn authenticate(&self, token: &str) -> AuthResult<Identity> {
        let kind = CredentialKind::classify(token);
        let user_id = self.verifier(kind).resolve(token).await?;
        let user = self.store.find_user_by_id(user_id).await?;

        Ok(Identity { user, kind })
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    fn verifier(&self, kind: CredentialKind) -> &dyn CredentialVerifier {
        match kind {
            CredentialKind::OpaqueSession => &self.sessions,
            CredentialKind::SignedToken => &self.signed,
        }
    }

    /// Validate input, early-exit on a taken email, and hash the password.
    ///
    /// Name and email are stored trimmed.
    async fn prepare_registration(&self, request: &mut RegisterRequest) -> AuthResult<String> {
        request.name = request.name.trim().to_string();
        request.email = request.email.trim().to_string();
        validate_registration(request)?;

        // Early exit only. The store's unique index is the source of truth.
        if self.store.user_exists(&request.email).await? {
            return Err(AuthError::EmailTaken);
        }

        self.hasher.hash(&request.password)
    }
}

/// Validate registration input.
fn validate_registration(request: &RegisterRequest) -> AuthResult<()> {
    if request.name.is_empty() {
        return Err(AuthError::MissingField("name"));
    }

    if request.email.is_empty() {
        return Err(AuthError::MissingField("email"));
    }

    if !request.email.contains('@') {
        return Err(AuthError::InvalidEmail(
            "Email must contain '@'".to_string(),
        ));
    }

    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    Ok(())
}

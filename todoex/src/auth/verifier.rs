//! Credential verifiers.
//!
//! Each credential scheme resolves a bearer token to a user id. The session
//! manager picks the verifier by [`CredentialKind::classify`], so a single
//! gate serves both schemes.

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    errors::AuthResult,
    jwt::TokenIssuer,
    models::{CredentialKind, UserId},
    store::CredentialStore,
};

/// Resolves a bearer token of one scheme to a user id.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    fn kind(&self) -> CredentialKind;

    async fn resolve(&self, token: &str) -> AuthResult<UserId>;
}

/// Looks the token up in the session table.
#[derive(Clone)]
pub struct OpaqueSessionVerifier {
    store: Arc<dyn CredentialStore>,
}

impl OpaqueSessionVerifier {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialVerifier for OpaqueSessionVerifier {
    fn kind(&self) -> CredentialKind {
        CredentialKind::OpaqueSession
    }

    async fn resolve(&self, token: &str) -> AuthResult<UserId> {
        self.store.find_user_id_by_session(token).await
    }
}

/// Checks signature and expiry; never touches storage.
#[derive(Clone)]
pub struct SignedTokenVerifier {
    issuer: TokenIssuer,
}

impl SignedTokenVerifier {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }
}

#[async_trait]
impl CredentialVerifier for SignedTokenVerifier {
    fn kind(&self) -> CredentialKind {
        CredentialKind::SignedToken
    }

    async fn resolve(&self, token: &str) -> AuthResult<UserId> {
        Ok(self.issuer.verify(token)?.user_id)
    }
}

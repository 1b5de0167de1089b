//! Password hashing and session token derivation.

use argon2::{
    Argon2, Params,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
        rand_core::OsRng,
    },
};
use chrono::Utc;
use sha2::{Digest, Sha512};

use super::errors::{AuthError, AuthResult};

/// Argon2id password hasher.
///
/// Each call to [`hash`](Self::hash) embeds a fresh random salt, so hashing
/// the same input twice yields different PHC strings.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    params: Option<Params>,
}

impl PasswordHasher {
    /// Hasher with explicit argon2 cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            params: Some(params),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        match &self.params {
            Some(params) => Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                params.clone(),
            ),
            None => Argon2::default(),
        }
    }

    /// Hash a plaintext password into a PHC string.
    pub fn hash(&self, plaintext: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored hash
    /// cannot be parsed. Parameters are read from the hash itself, so hashes
    /// produced with different costs still verify.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hashed).map_err(|_| AuthError::MalformedHash)?;

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::MalformedHash),
        }
    }
}

/// Deterministic SHA-512 digest rendered as 128 lowercase hex characters.
///
/// Fast and unsalted: use it to derive identifiers, never to store secrets.
pub fn digest(input: &str) -> String {
    hex::encode(Sha512::digest(input.as_bytes()))
}

/// Mint an opaque session token for `email`.
///
/// The digest covers the email, the current timestamp and a 32-byte nonce
/// from the OS RNG, so tokens are not predictable from public inputs.
pub fn mint_session_token(email: &str) -> String {
    let nonce: [u8; 32] = rand::random();
    digest(&format!(
        "{}{}{}",
        email,
        Utc::now().to_rfc3339(),
        hex::encode(nonce)
    ))
}

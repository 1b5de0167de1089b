//! Signed identity tokens.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{
    errors::{AuthError, AuthResult},
    models::{SIGNED_TOKEN_TTL, TokenClaims, UserId},
};

/// Issues and verifies HS256 tokens carrying `{userID, expiry}`.
///
/// The signing secret is injected once at construction and never changes.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        // `expiry` is not the registered `exp` claim, so the library's own
        // expiry handling is off and `verify` checks it instead.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user_id` expiring 24 hours from now.
    pub fn issue(&self, user_id: UserId) -> AuthResult<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`.
    pub fn issue_at(&self, user_id: UserId, issued_at: DateTime<Utc>) -> AuthResult<String> {
        let claims = TokenClaims {
            user_id,
            expiry: (issued_at + SIGNED_TOKEN_TTL).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::TokenEncoding)
    }

    /// Verify signature, structure and expiry.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Bad signature, wrong algorithm or malformed token
    /// * `AuthError::TokenExpired` - `expiry` is at or before now
    pub fn verify(&self, token: &str) -> AuthResult<TokenClaims> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<TokenClaims> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?
            .claims;

        if claims.expiry <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test_secret_key_for_testing_only")
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let token = issuer.issue_at(user_id, now).unwrap();
        let claims = issuer.verify_at(&token, now).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.expiry, (now + Duration::hours(24)).timestamp());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let issuer = issuer();
        let token = issuer.issue(Uuid::new_v4()).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let mut payload = parts[1].as_bytes().to_vec();
        payload[4] = if payload[4] == b'A' { b'B' } else { b'A' };
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            String::from_utf8(payload).unwrap(),
            parts[2]
        );

        assert!(matches!(issuer.verify(&tampered), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = issuer().issue(Uuid::new_v4()).unwrap();
        let other = TokenIssuer::new(b"a_completely_different_secret_key");

        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = issuer();
        let issued = Utc::now() - Duration::hours(25);
        let token = issuer.issue_at(Uuid::new_v4(), issued).unwrap();

        assert!(matches!(issuer.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_expiry_boundary() {
        let issuer = issuer();
        let issued = Utc::now();
        let token = issuer.issue_at(Uuid::new_v4(), issued).unwrap();
        let expiry = issued + Duration::hours(24);

        assert!(issuer.verify_at(&token, expiry - Duration::seconds(1)).is_ok());
        assert!(matches!(
            issuer.verify_at(&token, expiry),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            issuer().verify("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
    }
}

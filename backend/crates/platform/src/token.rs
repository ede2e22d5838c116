//! Signed Access Tokens
//!
//! HS256 JWTs carrying a user identity claim with expiry. The token is
//! opaque to clients; only [`TokenIssuer::verify`] interprets it.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Value of the `token_type` claim on access tokens
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Token errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token encoding failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("Token is invalid or expired: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("Token has wrong type: {0}")]
    WrongType(String),
}

/// Claims embedded in every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's database id
    pub sub: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Unique token id
    pub jti: String,
    pub token_type: String,
}

/// Issues and verifies access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue an access token for `user_id`
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            exp: now + self.ttl.as_secs() as i64,
            iat: now,
            jti: Uuid::new_v4().simple().to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encode)
    }

    /// Verify signature, expiry and token type
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(TokenError::Invalid)?
            .claims;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(TokenError::WrongType(claims.token_type));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret-that-is-long-enough-for-hmac", Duration::from_secs(60))
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let token = issuer.issue(42).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.token_type, ACCESS_TOKEN_TYPE);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_tokens_are_unique() {
        let issuer = issuer();
        let a = issuer.issue(1).unwrap();
        let b = issuer.issue(1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue(1).unwrap();
        let other = TokenIssuer::new(b"another-secret", Duration::from_secs(60));
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            exp: now - 10,
            iat: now - 70,
            jti: "x".into(),
            token_type: ACCESS_TOKEN_TYPE.into(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &issuer.encoding_key).unwrap();
        assert!(matches!(issuer.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            exp: now + 60,
            iat: now,
            jti: "x".into(),
            token_type: "refresh".into(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &issuer.encoding_key).unwrap();
        assert!(matches!(issuer.verify(&token), Err(TokenError::WrongType(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(issuer().verify("not.a.jwt").is_err());
    }
}

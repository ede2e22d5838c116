//! Application Configuration
//!
//! Configuration for the Auth application layer.

use platform::crypto::{random_secret, sha256};
use platform::token::TokenIssuer;
use std::time::Duration;

use crate::domain::confirmation::ConfirmationCodes;

/// Salt separating the token signing key from the code key
const TOKEN_KEY_SALT: &[u8] = b"reviews.auth.AccessToken";

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Application secret (32 bytes); signs confirmation codes and tokens
    pub secret_key: [u8; 32],
    /// Access token lifetime (1 day)
    pub access_token_ttl: Duration,
    /// Confirmation code lifetime (3 days)
    pub confirmation_code_ttl: Duration,
    /// Page size when `?limit=` is absent
    pub default_page_size: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: [0u8; 32],
            access_token_ttl: Duration::from_secs(24 * 3600),
            confirmation_code_ttl: Duration::from_secs(3 * 24 * 3600),
            default_page_size: 10,
        }
    }
}

impl AuthConfig {
    /// Create config with a random secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            secret_key: random_secret(),
            ..Default::default()
        }
    }

    /// Confirmation code service bound to this secret
    pub fn confirmation_codes(&self) -> ConfirmationCodes {
        ConfirmationCodes::new(&self.secret_key, self.confirmation_code_ttl)
    }

    /// Access token issuer keyed by `sha256(salt || secret)`
    pub fn token_issuer(&self) -> TokenIssuer {
        let mut material = TOKEN_KEY_SALT.to_vec();
        material.extend_from_slice(&self.secret_key);
        TokenIssuer::new(&sha256(&material), self.access_token_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_ttl.as_secs(), 86_400);
        assert_eq!(config.confirmation_code_ttl.as_secs(), 259_200);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn test_random_secret_differs() {
        assert_ne!(
            AuthConfig::with_random_secret().secret_key,
            AuthConfig::with_random_secret().secret_key
        );
    }

    #[test]
    fn test_token_issuer_uses_derived_key() {
        let config = AuthConfig::with_random_secret();
        let token = config.token_issuer().issue(7).unwrap();
        assert_eq!(config.token_issuer().verify(&token).unwrap().sub, 7);

        let raw = TokenIssuer::new(&config.secret_key, config.access_token_ttl);
        assert!(raw.verify(&token).is_err());
    }
}

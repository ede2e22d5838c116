//! Authenticate Use Case
//!
//! Resolves a bearer token to the principal making the request.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::domain::policy::Principal;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Authenticate use case
pub struct AuthenticateUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> AuthenticateUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Bad signature, expiry, unknown or inactive user all yield `InvalidToken`
    pub async fn execute(&self, token: &str) -> AuthResult<Principal> {
        let claims = self.config.token_issuer().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AuthError::InvalidToken
        })?;

        let user = self
            .user_repo
            .find_by_id(UserId::new(claims.sub))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active() {
            return Err(AuthError::InvalidToken);
        }

        Ok(Principal::from_user(&user))
    }
}

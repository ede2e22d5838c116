//! Obtain Token Use Case
//!
//! Exchanges a username and confirmation code for an access token,
//! activating the account on first use.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Obtain token input
pub struct ObtainTokenInput {
    pub user_name: String,
    pub confirmation_code: String,
}

/// Obtain token output
#[derive(Debug)]
pub struct ObtainTokenOutput {
    pub token: String,
}

/// Obtain token use case
pub struct ObtainTokenUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> ObtainTokenUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: ObtainTokenInput) -> AuthResult<ObtainTokenOutput> {
        // A name that fails validation cannot exist either
        let user = match UserName::new(&input.user_name) {
            Ok(name) => self.user_repo.find_by_user_name(&name).await?,
            Err(_) => None,
        };
        let Some(mut user) = user else {
            return Err(AuthError::field("username", "User not found"));
        };

        if !self
            .config
            .confirmation_codes()
            .check(&user, &input.confirmation_code)
        {
            tracing::warn!(user_id = %user.id, "Confirmation code rejected");
            return Err(AuthError::field(
                "confirmation_code",
                "Invalid or expired code",
            ));
        }

        if user.activate() {
            self.user_repo.update(&user).await?;
            tracing::info!(user_id = %user.id, "User activated");
        }

        let token = self
            .config
            .token_issuer()
            .issue(user.id.get())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "Access token issued");

        Ok(ObtainTokenOutput { token })
    }
}

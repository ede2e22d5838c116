//! Sign Up Use Case
//!
//! Registers a pending user and mails a confirmation code.

use std::sync::Arc;

use kernel::error::fields::FieldErrors;
use platform::mail::{Mailer, OutgoingMail};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::NewUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::{Email, EmailError},
    user_name::{UserName, UserNameError},
};
use crate::error::{AuthError, AuthResult};

pub const CONFIRMATION_SUBJECT: &str = "Registration confirmation code";

const USER_NAME_TAKEN: &str = "Username is already taken";
const EMAIL_TAKEN: &str = "This email is already in use";
const BOTH_TAKEN: &str = "Username or email is already in use";

/// Sign up input
pub struct SignUpInput {
    pub user_name: String,
    pub email: String,
}

/// Sign up output (normalised values as stored)
#[derive(Debug)]
pub struct SignUpOutput {
    pub user_name: String,
    pub email: String,
}

/// Sign up use case
pub struct SignUpUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, M> SignUpUseCase<U, M>
where
    U: UserRepository,
    M: Mailer + Sync,
{
    pub fn new(user_repo: Arc<U>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            mailer,
            config,
        }
    }

    /// Validation order: email format, username characters, reserved names,
    /// joint uniqueness, then username and email length.
    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let mut too_long: Option<(&'static str, String)> = None;

        let email = match Email::new(&input.email) {
            Ok(email) => Some(email),
            Err(e @ EmailError::TooLong { .. }) => {
                too_long = Some(("email", e.to_string()));
                None
            }
            Err(e) => return Err(AuthError::field("email", e.to_string())),
        };

        let user_name = match UserName::new(&input.user_name) {
            Ok(name) => Some(name),
            // Username length wins over email length
            Err(e @ UserNameError::TooLong { .. }) => {
                too_long = Some(("username", e.to_string()));
                None
            }
            Err(e) => return Err(AuthError::field("username", e.to_string())),
        };

        let user_name_taken = match &user_name {
            Some(name) => self.user_repo.find_by_user_name(name).await?.is_some(),
            None => false,
        };
        let email_taken = match &email {
            Some(email) => self.user_repo.find_by_email(email).await?.is_some(),
            None => false,
        };

        match (user_name_taken, email_taken) {
            (true, true) => {
                return Err(AuthError::Validation(
                    FieldErrors::single("username", BOTH_TAKEN).with("email", BOTH_TAKEN),
                ));
            }
            (true, false) => return Err(AuthError::field("username", USER_NAME_TAKEN)),
            (false, true) => return Err(AuthError::field("email", EMAIL_TAKEN)),
            (false, false) => {}
        }

        if let Some((field, message)) = too_long {
            return Err(AuthError::field(field, message));
        }
        let (Some(user_name), Some(email)) = (user_name, email) else {
            return Err(AuthError::Internal("signup fields unresolved".to_string()));
        };

        let user = self
            .user_repo
            .create(&NewUser::pending(user_name, email))
            .await?;

        let code = self.config.confirmation_codes().make(&user);
        let mail = OutgoingMail::new(
            user.email.as_str(),
            CONFIRMATION_SUBJECT,
            format!("Your confirmation code: {code}"),
        );

        if let Err(e) = self.mailer.send(&mail).await {
            // Release the username and email again
            if let Err(cleanup) = self.user_repo.delete(user.id).await {
                tracing::error!(
                    user_id = %user.id,
                    error = %cleanup,
                    "Failed to remove pending user after mail failure"
                );
            }
            return Err(AuthError::Mail(e));
        }

        tracing::info!(
            user_id = %user.id,
            user_name = %user.user_name,
            "User signed up"
        );

        Ok(SignUpOutput {
            user_name: user.user_name.into_inner(),
            email: user.email.as_str().to_string(),
        })
    }
}

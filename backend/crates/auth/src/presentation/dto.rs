//! API DTOs (Data Transfer Objects)
//!
//! Request fields are optional so a missing field is reported per field
//! rather than as a body rejection.

use kernel::error::fields::FieldErrors;
use platform::pagination::PageParams;
use serde::{Deserialize, Serialize};

use crate::application::{ObtainTokenInput, SignUpInput, SignUpOutput, UserInput};
use crate::domain::entity::user::User;

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl SignUpRequest {
    pub fn into_input(self) -> Result<SignUpInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let user_name = errors.require("username", self.username);
        let email = errors.require("email", self.email);
        errors.into_result()?;

        Ok(SignUpInput {
            user_name: user_name.unwrap_or_default(),
            email: email.unwrap_or_default(),
        })
    }
}

/// Sign up response
#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub username: String,
    pub email: String,
}

impl From<SignUpOutput> for SignUpResponse {
    fn from(output: SignUpOutput) -> Self {
        Self {
            username: output.user_name,
            email: output.email,
        }
    }
}

// ============================================================================
// Token
// ============================================================================

/// Token request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub confirmation_code: Option<String>,
}

impl TokenRequest {
    pub fn into_input(self) -> Result<ObtainTokenInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let user_name = errors.require("username", self.username);
        let confirmation_code = errors.require("confirmation_code", self.confirmation_code);
        errors.into_result()?;

        Ok(ObtainTokenInput {
            user_name: user_name.unwrap_or_default(),
            confirmation_code: confirmation_code.unwrap_or_default(),
        })
    }
}

/// Token response
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Users
// ============================================================================

/// Create/update user request (every field optional on PATCH)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

impl From<UserRequest> for UserInput {
    fn from(req: UserRequest) -> Self {
        Self {
            user_name: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            role: req.role,
        }
    }
}

/// User representation
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub bio: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.user_name.into_inner(),
            email: user.email.as_str().to_string(),
            first_name: user.profile.first_name,
            last_name: user.profile.last_name,
            role: user.user_role.code().to_string(),
            bio: user.profile.bio,
        }
    }
}

/// `GET /users` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl UserListQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_request_reports_missing_fields() {
        let errors = SignUpRequest::default().into_input().err().unwrap();
        assert!(errors.contains("username"));
        assert!(errors.contains("email"));
    }

    #[test]
    fn test_token_request_deserializes_snake_case() {
        let req: TokenRequest =
            serde_json::from_str(r#"{"username":"alice","confirmation_code":"abc"}"#).unwrap();
        let input = req.into_input().unwrap();
        assert_eq!(input.user_name, "alice");
        assert_eq!(input.confirmation_code, "abc");
    }

    #[test]
    fn test_user_request_ignores_unknown_fields() {
        let req: UserRequest =
            serde_json::from_str(r#"{"bio":"hi","is_staff":true}"#).unwrap();
        let input = UserInput::from(req);
        assert_eq!(input.bio.as_deref(), Some("hi"));
        assert!(input.user_name.is_none());
    }
}

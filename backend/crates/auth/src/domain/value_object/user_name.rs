//! User Name Value Object
//!
//! The public handle a user signs up with and is addressed by in URLs
//! (`/users/{username}`).
//!
//! ## Rules
//! - NFKC normalised, surrounding whitespace trimmed
//! - 1 to 150 characters
//! - Letters, digits and `_ . @ + -` only (Unicode letters/digits allowed)
//! - Reserved words are rejected (`me` collides with `/users/me`)

use derive_more::Display;
use serde::Serialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 150;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '@', '+', '-'];

/// Names that would shadow routes
const RESERVED_USER_NAMES: &[&str] = &["me"];

/// User name validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("Username cannot be empty")]
    Empty,

    #[error("Username contains invalid characters")]
    InvalidCharacters,

    #[error("Username is already taken")]
    Reserved,

    #[error("Username is too long")]
    TooLong { max: usize, actual: usize },
}

/// Validated user name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Normalise and validate
    ///
    /// Checks run in the order characters, reserved words, length.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserNameError> {
        let normalized: String = raw.as_ref().trim().nfkc().collect();

        if normalized.is_empty() {
            return Err(UserNameError::Empty);
        }

        if !normalized.chars().all(is_allowed_char) {
            return Err(UserNameError::InvalidCharacters);
        }

        if RESERVED_USER_NAMES.contains(&normalized.as_str()) {
            return Err(UserNameError::Reserved);
        }

        let length = normalized.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                max: USER_NAME_MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(normalized))
    }

    /// Rebuild from a stored value (already validated on write)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_allowed_char(c: char) -> bool {
    c.is_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c)
}

//! Profile Value Object
//!
//! Free-form, optional personal details shown on a user's record.

use kernel::error::fields::FieldErrors;
use serde::Serialize;

pub const FIRST_NAME_MAX_LENGTH: usize = 150;
pub const LAST_NAME_MAX_LENGTH: usize = 150;
pub const BIO_MAX_LENGTH: usize = 1000;

/// First name, last name and bio (each may be blank)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

impl Profile {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        bio: impl Into<String>,
    ) -> Result<Self, FieldErrors> {
        let profile = Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            bio: bio.into(),
        };
        let mut errors = FieldErrors::new();
        check_length(&mut errors, "first_name", &profile.first_name, FIRST_NAME_MAX_LENGTH);
        check_length(&mut errors, "last_name", &profile.last_name, LAST_NAME_MAX_LENGTH);
        check_length(&mut errors, "bio", &profile.bio, BIO_MAX_LENGTH);
        errors.into_result().map(|()| profile)
    }
}

/// Record a field error when `value` exceeds `max` characters
pub fn check_length(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this field has no more than {max} characters."),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_profile_is_valid() {
        assert_eq!(Profile::new("", "", "").unwrap(), Profile::default());
    }

    #[test]
    fn test_bio_limit() {
        assert!(Profile::new("", "", "b".repeat(BIO_MAX_LENGTH)).is_ok());
        let errors = Profile::new("", "", "b".repeat(BIO_MAX_LENGTH + 1)).unwrap_err();
        assert!(errors.contains("bio"));
        assert!(!errors.contains("first_name"));
    }

    #[test]
    fn test_reports_every_field() {
        let long = "x".repeat(FIRST_NAME_MAX_LENGTH + 1);
        let errors = Profile::new(long.clone(), long, "").unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["first_name", "last_name"]);
    }
}

//! Domain Value Objects
//!
//! Validated scalar types for the catalog domain.

use chrono::{Datelike, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Maximum slug length
pub const SLUG_MAX_LENGTH: usize = 50;

/// Maximum length of category, genre and title names
pub const NAME_MAX_LENGTH: usize = 256;

/// Review score bounds
pub const SCORE_MIN: i16 = 1;
pub const SCORE_MAX: i16 = 10;

/// Value validation errors, rendered as field messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("This field may not be blank.")]
    Blank,

    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { max: usize },

    #[error("Enter a valid slug consisting of letters, numbers, underscores or hyphens.")]
    InvalidSlug,

    #[error("Year must be between 0 and {max}.")]
    YearOutOfRange { max: i32 },

    #[error("Score must be between 1 and 10.")]
    ScoreOutOfRange,
}

/// URL-safe identifier of a category or genre (`[-a-zA-Z0-9_]+`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValueError> {
        let slug = raw.as_ref().trim();

        if slug.is_empty() {
            return Err(ValueError::Blank);
        }

        if slug.chars().count() > SLUG_MAX_LENGTH {
            return Err(ValueError::TooLong {
                max: SLUG_MAX_LENGTH,
            });
        }

        if !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValueError::InvalidSlug);
        }

        Ok(Self(slug.to_string()))
    }

    /// Rebuild from a stored value (already validated on write)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name of a category, genre or title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValueError> {
        let name = raw.as_ref().trim();

        if name.is_empty() {
            return Err(ValueError::Blank);
        }

        if name.chars().count() > NAME_MAX_LENGTH {
            return Err(ValueError::TooLong {
                max: NAME_MAX_LENGTH,
            });
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Release year, `0..=current year`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Year(i32);

impl Year {
    /// Validate against the current UTC year
    pub fn new(value: i32) -> Result<Self, ValueError> {
        Self::new_at(value, Utc::now().year())
    }

    /// Validate against an explicit current year
    pub fn new_at(value: i32, current_year: i32) -> Result<Self, ValueError> {
        if (0..=current_year).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValueError::YearOutOfRange { max: current_year })
        }
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

/// Review score, `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Score(i16);

impl Score {
    pub fn new(value: i64) -> Result<Self, ValueError> {
        if (i64::from(SCORE_MIN)..=i64::from(SCORE_MAX)).contains(&value) {
            Ok(Self(value as i16))
        } else {
            Err(ValueError::ScoreOutOfRange)
        }
    }

    /// Rebuild from a stored value (range enforced by a CHECK constraint)
    pub fn from_db(value: i16) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i16 {
        self.0
    }
}

/// Body of a review or comment; must contain something besides whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(String);

impl Text {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValueError> {
        let text = raw.into();
        if text.trim().is_empty() {
            return Err(ValueError::Blank);
        }
        Ok(Self(text))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

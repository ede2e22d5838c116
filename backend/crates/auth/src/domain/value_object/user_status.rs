//! User Status Value Object
//!
//! Two states only:
//! - **Pending**: signed up, confirmation code not yet exchanged
//! - **Active**: code exchanged at least once (or created by an admin)
//!
//! Pending accounts cannot authenticate with a bearer token.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserStatus {
    #[default]
    Pending = 0,
    Active = 1,
}

impl UserStatus {
    /// Numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Pending),
            1 => Some(Self::Active),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

//! User Entity
//!
//! A registered account. Users are created pending by signup (or active by
//! an admin) and never carry a password; the confirmation code is their only
//! credential.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{
    email::Email, profile::Profile, user_name::UserName, user_role::UserRole,
    user_status::UserStatus,
};

/// Persisted user
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    /// Unique handle, also the lookup key for `/users/{username}`
    pub user_name: UserName,
    /// Unique, lower-cased
    pub email: Email,
    pub user_role: UserRole,
    pub user_status: UserStatus,
    /// Operator flags, not writable through the API
    pub is_staff: bool,
    pub is_superuser: bool,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Superuser, staff or the admin role
    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.is_staff || self.user_role.is_admin()
    }

    pub fn is_active(&self) -> bool {
        self.user_status.is_active()
    }

    /// Mark the account active; returns `false` if it already was
    pub fn activate(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.user_status = UserStatus::Active;
        self.updated_at = Utc::now();
        true
    }

    pub fn set_user_name(&mut self, user_name: UserName) {
        self.user_name = user_name;
        self.updated_at = Utc::now();
    }

    pub fn set_email(&mut self, email: Email) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.user_role = role;
        self.updated_at = Utc::now();
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
        self.updated_at = Utc::now();
    }
}

/// User data before insertion (id and timestamps assigned by the store)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: UserName,
    pub email: Email,
    pub user_role: UserRole,
    pub user_status: UserStatus,
    pub profile: Profile,
}

impl NewUser {
    /// Signup registration: default role, inactive, blank profile
    pub fn pending(user_name: UserName, email: Email) -> Self {
        Self {
            user_name,
            email,
            user_role: UserRole::default(),
            user_status: UserStatus::Pending,
            profile: Profile::default(),
        }
    }

    /// Account created by an admin, usable immediately
    pub fn active(user_name: UserName, email: Email, user_role: UserRole, profile: Profile) -> Self {
        Self {
            user_name,
            email,
            user_role,
            user_status: UserStatus::Active,
            profile,
        }
    }

    /// Attach the store-assigned id and timestamps
    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> User {
        User {
            id,
            user_name: self.user_name,
            email: self.email,
            user_role: self.user_role,
            user_status: self.user_status,
            is_staff: false,
            is_superuser: false,
            profile: self.profile,
            created_at: now,
            updated_at: now,
        }
    }
}

//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::UserId;
use platform::pagination::PageRequest;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user; unique violations surface as field errors
    async fn create(&self, user: &NewUser) -> AuthResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Find user by user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Page of users ordered by user name, plus the total match count.
    /// `search` is a case-insensitive substring of username, email or role.
    async fn list(&self, search: Option<&str>, page: PageRequest) -> AuthResult<(Vec<User>, u64)>;

    /// Persist every mutable column of `user`
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Delete user; returns `false` if nothing was deleted
    async fn delete(&self, user_id: UserId) -> AuthResult<bool>;
}

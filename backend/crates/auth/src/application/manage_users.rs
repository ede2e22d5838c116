//! Manage Users Use Case
//!
//! Admin CRUD over `/users` and self-service over `/users/me`.

use std::sync::Arc;

use kernel::error::fields::FieldErrors;
use platform::pagination::{Page, PageRequest};

use crate::domain::entity::user::{NewUser, User};
use crate::domain::policy::{AccessPolicy, Operation, Requester};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    profile::{BIO_MAX_LENGTH, FIRST_NAME_MAX_LENGTH, LAST_NAME_MAX_LENGTH, Profile, check_length},
    user_name::UserName,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const USER_NAME_EXISTS: &str = "A user with that username already exists.";
const EMAIL_EXISTS: &str = "A user with that email already exists.";

/// Fields accepted on create and update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

/// Validated changes
#[derive(Debug, Default)]
struct UserChanges {
    user_name: Option<UserName>,
    email: Option<Email>,
    role: Option<UserRole>,
    first_name: Option<String>,
    last_name: Option<String>,
    bio: Option<String>,
}

/// Manage users use case
pub struct ManageUsersUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ManageUsersUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// GET /users
    pub async fn list(
        &self,
        requester: &Requester,
        search: Option<&str>,
        page: PageRequest,
    ) -> AuthResult<Page<User>> {
        AccessPolicy::AdminOnly.check(requester, Operation::Read)?;

        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let (users, count) = self.user_repo.list(search, page).await?;
        Ok(Page::new(users, count, page))
    }

    /// POST /users
    pub async fn create(&self, requester: &Requester, input: UserInput) -> AuthResult<User> {
        AccessPolicy::AdminOnly.check(requester, Operation::Write)?;

        let mut required = FieldErrors::new();
        required.require("username", input.user_name.as_ref());
        required.require("email", input.email.as_ref());
        required.into_result()?;

        let changes = self.validate(input, None).await?;
        let (Some(user_name), Some(email)) = (changes.user_name, changes.email) else {
            return Err(AuthError::Internal("required user fields unresolved".to_string()));
        };
        let profile = Profile {
            first_name: changes.first_name.unwrap_or_default(),
            last_name: changes.last_name.unwrap_or_default(),
            bio: changes.bio.unwrap_or_default(),
        };

        let user = self
            .user_repo
            .create(&NewUser::active(
                user_name,
                email,
                changes.role.unwrap_or_default(),
                profile,
            ))
            .await?;

        tracing::info!(user_id = %user.id, user_name = %user.user_name, "User created");
        Ok(user)
    }

    /// GET /users/{username}
    pub async fn get(&self, requester: &Requester, user_name: &str) -> AuthResult<User> {
        AccessPolicy::AdminOnly.check(requester, Operation::Read)?;
        self.find(user_name).await
    }

    /// PATCH /users/{username}
    pub async fn update(
        &self,
        requester: &Requester,
        user_name: &str,
        input: UserInput,
    ) -> AuthResult<User> {
        AccessPolicy::AdminOnly.check(requester, Operation::Write)?;

        let mut user = self.find(user_name).await?;
        let changes = self.validate(input, Some(&user)).await?;
        apply(&mut user, changes);
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// DELETE /users/{username}
    pub async fn delete(&self, requester: &Requester, user_name: &str) -> AuthResult<()> {
        AccessPolicy::AdminOnly.check(requester, Operation::Write)?;

        let user = self.find(user_name).await?;
        if !self.user_repo.delete(user.id).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %user.id, "User deleted");
        Ok(())
    }

    /// GET /users/me
    pub async fn me(&self, requester: &Requester) -> AuthResult<User> {
        AccessPolicy::Authenticated.check(requester, Operation::Read)?;
        let principal = requester.require_principal()?;

        self.user_repo
            .find_by_id(principal.id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// PATCH /users/me; `role` is ignored unless the requester is an admin
    pub async fn update_me(&self, requester: &Requester, mut input: UserInput) -> AuthResult<User> {
        AccessPolicy::Authenticated.check(requester, Operation::Write)?;
        let principal = requester.require_principal()?;

        if !principal.is_admin() {
            input.role = None;
        }

        let mut user = self
            .user_repo
            .find_by_id(principal.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let changes = self.validate(input, Some(&user)).await?;
        apply(&mut user, changes);
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    async fn find(&self, user_name: &str) -> AuthResult<User> {
        let Ok(user_name) = UserName::new(user_name) else {
            return Err(AuthError::UserNotFound);
        };
        self.user_repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Validate every supplied field, collecting all errors.
    /// Uniqueness ignores `current` so a user may resubmit their own values.
    async fn validate(&self, input: UserInput, current: Option<&User>) -> AuthResult<UserChanges> {
        let mut errors = FieldErrors::new();
        let mut changes = UserChanges::default();
        let is_other = |other: &User| current.is_none_or(|user| user.id != other.id);

        if let Some(raw) = input.user_name {
            match UserName::new(&raw) {
                Ok(name) => match self.user_repo.find_by_user_name(&name).await? {
                    Some(other) if is_other(&other) => errors.add("username", USER_NAME_EXISTS),
                    _ => changes.user_name = Some(name),
                },
                Err(e) => errors.add("username", e.to_string()),
            }
        }

        if let Some(raw) = input.email {
            match Email::new(&raw) {
                Ok(email) => match self.user_repo.find_by_email(&email).await? {
                    Some(other) if is_other(&other) => errors.add("email", EMAIL_EXISTS),
                    _ => changes.email = Some(email),
                },
                Err(e) => errors.add("email", e.to_string()),
            }
        }

        if let Some(raw) = input.role {
            match UserRole::from_code(raw.trim()) {
                Some(role) => changes.role = Some(role),
                None => errors.add("role", format!("\"{raw}\" is not a valid choice.")),
            }
        }

        if let Some(first_name) = input.first_name {
            check_length(&mut errors, "first_name", &first_name, FIRST_NAME_MAX_LENGTH);
            changes.first_name = Some(first_name);
        }
        if let Some(last_name) = input.last_name {
            check_length(&mut errors, "last_name", &last_name, LAST_NAME_MAX_LENGTH);
            changes.last_name = Some(last_name);
        }
        if let Some(bio) = input.bio {
            check_length(&mut errors, "bio", &bio, BIO_MAX_LENGTH);
            changes.bio = Some(bio);
        }

        errors.into_result()?;
        Ok(changes)
    }
}

fn apply(user: &mut User, changes: UserChanges) {
    if let Some(user_name) = changes.user_name {
        user.set_user_name(user_name);
    }
    if let Some(email) = changes.email {
        user.set_email(email);
    }
    if let Some(role) = changes.role {
        user.set_role(role);
    }

    let mut profile = user.profile.clone();
    if let Some(first_name) = changes.first_name {
        profile.first_name = first_name;
    }
    if let Some(last_name) = changes.last_name {
        profile.last_name = last_name;
    }
    if let Some(bio) = changes.bio {
        profile.bio = bio;
    }
    if profile != user.profile {
        user.set_profile(profile);
    }
}

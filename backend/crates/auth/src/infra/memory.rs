//! In-memory test doubles
//!
//! Mirrors the unique constraints of the `users` table so use cases can be
//! exercised without a database.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use kernel::id::UserId;
use platform::mail::{MailError, Mailer, OutgoingMail};
use platform::pagination::PageRequest;
use platform::search::contains_ignore_case;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

/// `UserRepository` backed by a map
#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored user
    pub fn all(&self) -> Vec<User> {
        self.state.lock().unwrap().users.values().cloned().collect()
    }

    /// Overwrite a stored user directly (test setup)
    pub fn put(&self, user: User) {
        self.state.lock().unwrap().users.insert(user.id.get(), user);
    }

    fn check_unique(state: &State, user_name: &UserName, email: &Email, id: Option<UserId>) -> AuthResult<()> {
        for user in state.users.values() {
            if Some(user.id) == id {
                continue;
            }
            if user.user_name == *user_name {
                return Err(AuthError::field("username", "A user with that username already exists."));
            }
            if user.email == *email {
                return Err(AuthError::field("email", "A user with that email already exists."));
            }
        }
        Ok(())
    }
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let mut state = self.state.lock().unwrap();
        Self::check_unique(&state, &user.user_name, &user.email, None)?;

        state.next_id += 1;
        let user = user.clone().into_user(UserId::new(state.next_id), Utc::now());
        state.users.insert(user.id.get(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&user_id.get()).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().find(|u| u.user_name == *user_name).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.values().find(|u| u.email == *email).cloned())
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> AuthResult<(Vec<User>, u64)> {
        let state = self.state.lock().unwrap();
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| {
                search.is_none_or(|term| {
                    contains_ignore_case(u.user_name.as_str(), term)
                        || contains_ignore_case(u.email.as_str(), term)
                        || contains_ignore_case(u.user_role.code(), term)
                })
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.user_name.as_str().cmp(b.user_name.as_str()));

        let count = users.len() as u64;
        Ok((page.apply(users), count))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_unique(&state, &user.user_name, &user.email, Some(user.id))?;
        state.users.insert(user.id.get(), user.clone());
        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> AuthResult<bool> {
        Ok(self.state.lock().unwrap().users.remove(&user_id.get()).is_some())
    }
}

/// Keeps every message instead of sending it
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Rejects every message
#[derive(Clone, Default)]
pub struct FailingMailer;

impl Mailer for FailingMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
        Err(MailError::Build("transport unavailable".to_string()))
    }
}

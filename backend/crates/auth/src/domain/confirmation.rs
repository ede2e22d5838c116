//! Confirmation Codes
//!
//! Stateless, time-limited codes mailed at signup and exchanged for an
//! access token. A code is `"{ts36}-{mac}"`:
//! - `ts36` - issue time, Unix seconds in base36
//! - `mac`  - first 20 hex chars of a salted HMAC-SHA256 over
//!   `id|username|email|ts`
//!
//! Nothing is stored server-side. Changing the username or email makes every
//! outstanding code for that user fail.

use chrono::Utc;
use platform::crypto::{constant_time_eq, from_base36, salted_hmac, to_base36, to_hex};
use std::time::Duration;

use crate::domain::entity::user::User;

const KEY_SALT: &str = "reviews.auth.ConfirmationCodes";
const MAC_HEX_LENGTH: usize = 20;

/// Issues and checks confirmation codes
#[derive(Clone)]
pub struct ConfirmationCodes {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for ConfirmationCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationCodes")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ConfirmationCodes {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            secret: secret.to_vec(),
            ttl,
        }
    }

    /// Code for `user`, stamped now
    pub fn make(&self, user: &User) -> String {
        self.make_at(user, Utc::now().timestamp())
    }

    /// Code for `user`, stamped at `timestamp` (Unix seconds)
    pub fn make_at(&self, user: &User, timestamp: i64) -> String {
        let ts = u64::try_from(timestamp).unwrap_or(0);
        format!("{}-{}", to_base36(ts), self.mac(user, ts))
    }

    /// Check `code` against `user` at the current time
    pub fn check(&self, user: &User, code: &str) -> bool {
        self.check_at(user, code, Utc::now().timestamp())
    }

    /// Check `code` against `user` as of `now` (Unix seconds)
    pub fn check_at(&self, user: &User, code: &str, now: i64) -> bool {
        let Some((ts36, mac)) = code.trim().split_once('-') else {
            return false;
        };
        let Some(ts) = from_base36(ts36) else {
            return false;
        };

        if !constant_time_eq(self.mac(user, ts).as_bytes(), mac.as_bytes()) {
            return false;
        }

        let Ok(issued_at) = i64::try_from(ts) else {
            return false;
        };
        let age = now - issued_at;
        age >= 0 && age.unsigned_abs() <= self.ttl.as_secs()
    }

    fn mac(&self, user: &User, ts: u64) -> String {
        let value = format!("{}|{}|{}|{}", user.id, user.user_name, user.email, ts);
        let digest = salted_hmac(KEY_SALT, &self.secret, value.as_bytes());
        let mut hex = to_hex(&digest);
        hex.truncate(MAC_HEX_LENGTH);
        hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::NewUser;
    use crate::domain::value_object::{email::Email, user_name::UserName};
    use kernel::id::UserId;

    const TTL: Duration = Duration::from_secs(3 * 24 * 3600);
    const NOW: i64 = 1_700_000_000;

    fn codes() -> ConfirmationCodes {
        ConfirmationCodes::new(b"unit-test-secret", TTL)
    }

    fn user(id: i64, name: &str) -> User {
        NewUser::pending(
            UserName::new(name).unwrap(),
            Email::new(format!("{name}@example.com")).unwrap(),
        )
        .into_user(UserId::new(id), Utc::now())
    }

    #[test]
    fn test_code_validates_for_its_user() {
        let alice = user(1, "alice");
        let code = codes().make_at(&alice, NOW);
        assert!(codes().check_at(&alice, &code, NOW));
        assert!(codes().check_at(&alice, &code, NOW + 60));
    }

    #[test]
    fn test_code_format() {
        let code = codes().make_at(&user(1, "alice"), NOW);
        let (ts36, mac) = code.split_once('-').unwrap();
        assert_eq!(from_base36(ts36), Some(NOW as u64));
        assert_eq!(mac.len(), MAC_HEX_LENGTH);
    }

    #[test]
    fn test_code_fails_for_other_user() {
        let code = codes().make_at(&user(1, "alice"), NOW);
        assert!(!codes().check_at(&user(2, "bob"), &code, NOW));
        // Same id, different username
        assert!(!codes().check_at(&user(1, "alicia"), &code, NOW));
    }

    #[test]
    fn test_code_fails_after_email_change() {
        let mut alice = user(1, "alice");
        let code = codes().make_at(&alice, NOW);
        alice.set_email(Email::new("new@example.com").unwrap());
        assert!(!codes().check_at(&alice, &code, NOW));
    }

    #[test]
    fn test_code_survives_activation() {
        let mut alice = user(1, "alice");
        let code = codes().make_at(&alice, NOW);
        alice.activate();
        assert!(codes().check_at(&alice, &code, NOW));
    }

    #[test]
    fn test_code_expires() {
        let alice = user(1, "alice");
        let code = codes().make_at(&alice, NOW);
        let ttl = TTL.as_secs() as i64;
        assert!(codes().check_at(&alice, &code, NOW + ttl));
        assert!(!codes().check_at(&alice, &code, NOW + ttl + 1));
        // Issued in the future
        assert!(!codes().check_at(&alice, &code, NOW - 1));
    }

    #[test]
    fn test_different_secret_rejects() {
        let alice = user(1, "alice");
        let code = codes().make_at(&alice, NOW);
        let other = ConfirmationCodes::new(b"another-secret", TTL);
        assert!(!other.check_at(&alice, &code, NOW));
    }

    #[test]
    fn test_malformed_codes() {
        let alice = user(1, "alice");
        for code in ["", "-", "nodash", "ZZ-abc", "1-", "!!-0123456789abcdef0123"] {
            assert!(!codes().check_at(&alice, code, NOW), "{code:?} should fail");
        }
    }
}

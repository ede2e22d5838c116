//! Access Control Policy
//!
//! Who may do what. Every request resolves to a [`Requester`]; endpoints
//! declare an [`AccessPolicy`] and ask it whether an [`Operation`] is
//! allowed, first for the endpoint and then, once the target is loaded, for
//! the object itself.

use http::Method;
use kernel::id::UserId;

use crate::domain::entity::user::User;
use crate::domain::value_object::{user_name::UserName, user_role::UserRole};

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub user_name: UserName,
    pub role: UserRole,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Principal {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
            role: user.user_role,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.is_staff || self.role.is_admin()
    }

    pub fn is_moderator_or_admin(&self) -> bool {
        self.is_admin() || self.role.is_moderator_or_higher()
    }
}

/// Caller of a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Requester {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl Requester {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(principal) => Some(principal),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_admin(&self) -> bool {
        self.principal().is_some_and(Principal::is_admin)
    }

    /// The principal, or `AuthenticationRequired`
    pub fn require_principal(&self) -> Result<&Principal, Denial> {
        self.principal().ok_or(Denial::AuthenticationRequired)
    }
}

/// Safe (read) or unsafe (write) request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    /// GET, HEAD and OPTIONS are reads; everything else writes
    pub fn from_method(method: &Method) -> Self {
        if *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS {
            Self::Read
        } else {
            Self::Write
        }
    }
}

/// Why access was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Anonymous caller (401)
    AuthenticationRequired,
    /// Authenticated but not allowed (403)
    PermissionDenied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Authenticated admins only
    AdminOnly,
    /// Anyone reads, admins write
    ReadOnlyOrAdmin,
    /// Anyone reads, authenticated users write; objects are changed by
    /// their author or by moderators and admins
    ReadOnlyOrAuthenticated,
    /// Any authenticated user
    Authenticated,
}

impl AccessPolicy {
    /// Endpoint-level check
    pub fn check(&self, requester: &Requester, operation: Operation) -> Result<(), Denial> {
        match self {
            Self::AdminOnly => require_admin(requester),
            Self::ReadOnlyOrAdmin => match operation {
                Operation::Read => Ok(()),
                Operation::Write => require_admin(requester),
            },
            Self::ReadOnlyOrAuthenticated => match operation {
                Operation::Read => Ok(()),
                Operation::Write => requester.require_principal().map(|_| ()),
            },
            Self::Authenticated => requester.require_principal().map(|_| ()),
        }
    }

    /// Object-level check, run after the target has been located
    ///
    /// `author` is the owning user for authored content, `None` otherwise.
    pub fn check_object(
        &self,
        requester: &Requester,
        operation: Operation,
        author: Option<UserId>,
    ) -> Result<(), Denial> {
        self.check(requester, operation)?;

        match (self, operation) {
            (_, Operation::Read) => Ok(()),
            (Self::ReadOnlyOrAuthenticated, Operation::Write) => {
                let principal = requester.require_principal()?;
                let is_author = author.is_some_and(|author| author == principal.id);
                if is_author || principal.is_moderator_or_admin() {
                    Ok(())
                } else {
                    Err(Denial::PermissionDenied)
                }
            }
            (_, Operation::Write) => Ok(()),
        }
    }
}

fn require_admin(requester: &Requester) -> Result<(), Denial> {
    let principal = requester.require_principal()?;
    if principal.is_admin() {
        Ok(())
    } else {
        Err(Denial::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(id: i64, role: UserRole) -> Requester {
        Requester::Authenticated(Principal {
            id: UserId::new(id),
            user_name: UserName::new(format!("user{id}")).unwrap(),
            role,
            is_staff: false,
            is_superuser: false,
        })
    }

    #[test]
    fn test_operation_from_method() {
        assert_eq!(Operation::from_method(&Method::GET), Operation::Read);
        assert_eq!(Operation::from_method(&Method::HEAD), Operation::Read);
        assert_eq!(Operation::from_method(&Method::OPTIONS), Operation::Read);
        assert_eq!(Operation::from_method(&Method::POST), Operation::Write);
        assert_eq!(Operation::from_method(&Method::PATCH), Operation::Write);
        assert_eq!(Operation::from_method(&Method::DELETE), Operation::Write);
    }

    #[test]
    fn test_admin_only() {
        let policy = AccessPolicy::AdminOnly;
        assert_eq!(
            policy.check(&Requester::Anonymous, Operation::Read),
            Err(Denial::AuthenticationRequired)
        );
        assert_eq!(
            policy.check(&principal(1, UserRole::Moderator), Operation::Read),
            Err(Denial::PermissionDenied)
        );
        assert_eq!(policy.check(&principal(1, UserRole::Admin), Operation::Write), Ok(()));
    }

    #[test]
    fn test_staff_flag_counts_as_admin() {
        let requester = Requester::Authenticated(Principal {
            id: UserId::new(5),
            user_name: UserName::new("staff").unwrap(),
            role: UserRole::User,
            is_staff: true,
            is_superuser: false,
        });
        assert_eq!(AccessPolicy::AdminOnly.check(&requester, Operation::Write), Ok(()));
    }

    #[test]
    fn test_read_only_or_admin() {
        let policy = AccessPolicy::ReadOnlyOrAdmin;
        assert_eq!(policy.check(&Requester::Anonymous, Operation::Read), Ok(()));
        assert_eq!(
            policy.check(&Requester::Anonymous, Operation::Write),
            Err(Denial::AuthenticationRequired)
        );
        assert_eq!(
            policy.check(&principal(1, UserRole::User), Operation::Write),
            Err(Denial::PermissionDenied)
        );
        assert_eq!(policy.check(&principal(1, UserRole::Admin), Operation::Write), Ok(()));
        assert_eq!(
            policy.check_object(&Requester::Anonymous, Operation::Read, None),
            Ok(())
        );
    }

    #[test]
    fn test_read_only_or_authenticated_ownership() {
        let policy = AccessPolicy::ReadOnlyOrAuthenticated;
        let author = Some(UserId::new(1));

        assert_eq!(policy.check(&Requester::Anonymous, Operation::Read), Ok(()));
        assert_eq!(
            policy.check(&Requester::Anonymous, Operation::Write),
            Err(Denial::AuthenticationRequired)
        );
        assert_eq!(policy.check(&principal(2, UserRole::User), Operation::Write), Ok(()));

        assert_eq!(
            policy.check_object(&principal(1, UserRole::User), Operation::Write, author),
            Ok(())
        );
        assert_eq!(
            policy.check_object(&principal(2, UserRole::User), Operation::Write, author),
            Err(Denial::PermissionDenied)
        );
        assert_eq!(
            policy.check_object(&principal(3, UserRole::Moderator), Operation::Write, author),
            Ok(())
        );
        assert_eq!(
            policy.check_object(&principal(4, UserRole::Admin), Operation::Write, author),
            Ok(())
        );
        assert_eq!(
            policy.check_object(&principal(2, UserRole::User), Operation::Read, author),
            Ok(())
        );
    }

    #[test]
    fn test_authenticated() {
        let policy = AccessPolicy::Authenticated;
        assert_eq!(
            policy.check(&Requester::Anonymous, Operation::Read),
            Err(Denial::AuthenticationRequired)
        );
        assert_eq!(policy.check(&principal(1, UserRole::User), Operation::Write), Ok(()));
    }
}

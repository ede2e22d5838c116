//! Domain Layer
//!
//! Contains entities, value objects, confirmation codes, access policy and
//! repository traits.

pub mod confirmation;
pub mod entity;
pub mod policy;
pub mod repository;
pub mod value_object;

// Re-exports
pub use confirmation::ConfirmationCodes;
pub use entity::{NewUser, User};
pub use policy::{AccessPolicy, Denial, Operation, Principal, Requester};
pub use repository::UserRepository;

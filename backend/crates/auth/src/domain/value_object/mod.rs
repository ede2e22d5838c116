//! Value Object Module

pub mod email;
pub mod profile;
pub mod user_name;
pub mod user_role;
pub mod user_status;

pub use email::{Email, EmailError};
pub use profile::Profile;
pub use user_name::{UserName, UserNameError};
pub use user_role::UserRole;
pub use user_status::UserStatus;

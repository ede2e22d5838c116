//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, confirmation codes, access policy,
//!   repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Passwordless signup: a confirmation code is mailed to the user
//! - Code exchange for a signed bearer token (JWT, HS256)
//! - Role-based access (User, Moderator, Admin) plus staff/superuser flags
//! - Admin user management and self-service profile (`/users/me`)
//!
//! ## Security Model
//! - Confirmation codes are stateless HMACs over the account's identity
//!   fields and expire after a fixed window
//! - Tokens carry only the user id; role and activation are re-read from
//!   the database on every request

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::policy::{AccessPolicy, Denial, Operation, Principal, Requester};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::{RequesterState, resolve_requester};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

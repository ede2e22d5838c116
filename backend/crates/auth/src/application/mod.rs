//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod manage_users;
pub mod obtain_token;
pub mod sign_up;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use config::AuthConfig;
pub use manage_users::{ManageUsersUseCase, UserInput};
pub use obtain_token::{ObtainTokenInput, ObtainTokenOutput, ObtainTokenUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};

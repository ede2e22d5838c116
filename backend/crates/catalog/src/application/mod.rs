//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod config;
mod input;
pub mod manage_terms;
pub mod manage_titles;
pub mod moderate_comments;
pub mod moderate_reviews;

// Re-exports
pub use config::CatalogConfig;
pub use manage_terms::{ManageTermsUseCase, TermInput};
pub use manage_titles::{ManageTitlesUseCase, TitleInput};
pub use moderate_comments::{CommentInput, CommentsUseCase};
pub use moderate_reviews::{ReviewInput, ReviewsUseCase};

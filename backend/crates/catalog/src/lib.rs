//! Catalog Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, rating aggregation, repository traits
//! - `application/` - Use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Categories and genres addressed by slug
//! - Titles classified by one category and a non-empty set of genres
//! - One review per user and title, with comments under each review
//! - Title rating recomputed as the mean score on every review write
//!
//! ## Access Model
//! - Anyone reads; admins manage categories, genres and titles
//! - Authenticated users write reviews and comments; authors, moderators and
//!   admins may change or remove them

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use infra::postgres::PgCatalogRepository;
pub use presentation::router::catalog_router;

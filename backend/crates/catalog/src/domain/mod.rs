//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Category, Genre, Title, Review, Comment)
//! - Domain value objects (Slug, Name, Year, Score, Text)
//! - Domain services (rating aggregation, slug resolution)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;

// Re-exports
pub use entities::{Category, Comment, Genre, Review, Term, TermKind, Title, TitleChanges, TitleFilter};
pub use repository::{
    CatalogRepository, CommentRepository, ReviewRepository, TermRepository, TitleRepository,
};
pub use services::recompute_rating;

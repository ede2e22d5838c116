//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases (including field-level validation errors)
//! - Typed database identifiers
//! - JSON body extraction that reports type errors per field (`axum` feature)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod fields;
    pub mod kind;
}
#[cfg(feature = "axum")]
pub mod extract;
pub mod id;

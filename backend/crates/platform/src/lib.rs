//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC, base36 time stamps)
//! - Signed access tokens (JWT, HS256)
//! - Outbound email channel (SMTP or log)
//! - Pagination and search helpers for list endpoints

pub mod crypto;
pub mod mail;
pub mod pagination;
pub mod search;
pub mod token;

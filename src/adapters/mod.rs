//! Infrastructure adapters. Implement outbound ports.
//!
//! Discord (REST + gateway), SQLite, OAuth, embed rendering. Map errors to DomainError.

pub mod discord;
pub mod oauth;
pub mod persistence;
pub mod render;

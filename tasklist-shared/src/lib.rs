//! # Tasklist Shared Library
//!
//! Domain types, storage and business logic used by the Tasklist API server
//! and its tooling binaries.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `store`: Storage traits with Postgres and in-memory backends
//! - `auth`: Passwords, bearer tokens, authentication gate and ownership policy
//! - `services`: Account (register/login) and task operations
//! - `validation`: Per-field validation error collection
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;

/// Current version of the Tasklist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

//! Infrastructure layer: configuration, persistence and store-backed session checks.

/// Configuration loading and representation.
pub mod config;

/// Session resolver that re-checks the stored role.
pub mod resolver;

/// Identity and product stores (in-memory and Postgres).
pub mod store;

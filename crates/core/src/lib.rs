//! `storefront-core` — shared building blocks (ids, domain errors).
//!
//! This crate contains **pure** primitives (no IO, no HTTP, no storage).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ProductId, SubjectId};

//! Storage capabilities injected into entry points.
//!
//! Every store is an explicit dependency (`Arc<dyn …>`) handed to the HTTP
//! layer, never a process-wide handle, so tests can substitute the in-memory
//! implementations.

use async_trait::async_trait;
use thiserror::Error;

use storefront_auth::User;
use storefront_catalog::Product;
use storefront_core::{ProductId, SubjectId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryIdentityStore, InMemoryProductStore};
pub use postgres::{PostgresIdentityStore, PostgresProductStore, connect, ensure_schema};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored row could not be mapped back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted identities (the backing records of sessions).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get(&self, id: SubjectId) -> Result<Option<User>, StoreError>;

    /// Lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Fails with `Conflict` if the id or email is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    /// Fails with `NotFound` if absent, `Conflict` if the new email is taken.
    async fn update(&self, user: User) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: SubjectId) -> Result<bool, StoreError>;
}

/// Persisted catalog products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All products, oldest first.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn insert(&self, product: Product) -> Result<(), StoreError>;

    async fn update(&self, product: Product) -> Result<(), StoreError>;

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;
}

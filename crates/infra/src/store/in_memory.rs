use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_auth::User;
use storefront_catalog::Product;
use storefront_core::{ProductId, SubjectId};

use super::{IdentityStore, ProductStore, StoreError};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

/// In-memory identity store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<HashMap<SubjectId, User>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn get(&self, id: SubjectId) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut users: Vec<User> = map.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.id)));
        }
        if map.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        map.insert(user.id, user);
        Ok(())
    }

    async fn update(&self, user: User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if !map.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        if map.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        map.insert(user.id, user);
        Ok(())
    }

    async fn delete(&self, id: SubjectId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        Ok(map.remove(&id).is_some())
    }
}

/// In-memory product store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut products: Vec<Product> = map.values().cloned().collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.contains_key(&product.id) {
            return Err(StoreError::Conflict(format!("product {} already exists", product.id)));
        }
        map.insert(product.id, product);
        Ok(())
    }

    async fn update(&self, product: Product) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        match map.get_mut(&product.id) {
            Some(slot) => {
                *slot = product;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        Ok(map.remove(&id).is_some())
    }
}

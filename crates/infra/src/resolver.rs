//! Session resolution cross-checked against the identity store.
//!
//! A token keeps its role claim until it expires, so a demoted account would
//! otherwise keep its old access for the whole session lifetime. Wrapping the
//! token resolver here drops any session whose role no longer matches the
//! stored record.

use std::sync::Arc;

use async_trait::async_trait;

use storefront_auth::{ResolveError, Session, SessionResolver};

use crate::store::IdentityStore;

pub struct StoredRoleResolver<R> {
    inner: R,
    identities: Arc<dyn IdentityStore>,
}

impl<R> StoredRoleResolver<R> {
    pub fn new(inner: R, identities: Arc<dyn IdentityStore>) -> Self {
        Self { inner, identities }
    }
}

#[async_trait]
impl<R> SessionResolver for StoredRoleResolver<R>
where
    R: SessionResolver,
{
    async fn resolve(&self, credential: &str) -> Result<Option<Session>, ResolveError> {
        let Some(session) = self.inner.resolve(credential).await? else {
            return Ok(None);
        };

        match self.identities.get(session.subject_id).await {
            Ok(Some(user)) if user.role == session.role => Ok(Some(session)),
            Ok(Some(user)) => {
                tracing::info!(
                    subject_id = %session.subject_id,
                    token_role = %session.role,
                    stored_role = %user.role,
                    "session role is stale"
                );
                Ok(None)
            }
            // A missing record is the page guards' concern; see `page_guard`.
            Ok(None) => Ok(Some(session)),
            Err(e) => Err(ResolveError::Unavailable(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use storefront_auth::{Role, SessionTokens, SubjectId, TokenSessionResolver, User};

    use crate::store::InMemoryIdentityStore;

    const SECRET: &[u8] = b"stored-role-secret-0123456789abcd";

    async fn setup(role: Role) -> (StoredRoleResolver<TokenSessionResolver>, Arc<InMemoryIdentityStore>, User, String) {
        let tokens = SessionTokens::new(SECRET);
        let identities = Arc::new(InMemoryIdentityStore::new());
        let user = User::new(SubjectId::new(), "someone@example.com", "Someone", role, "unused".into(), Utc::now())
            .unwrap();
        identities.insert(user.clone()).await.unwrap();
        let token = tokens.issue(user.id, user.role, Duration::minutes(5)).unwrap();
        let resolver = StoredRoleResolver::new(TokenSessionResolver::new(tokens), identities.clone());
        (resolver, identities, user, token)
    }

    #[tokio::test]
    async fn matching_role_resolves() {
        let (resolver, _, user, token) = setup(Role::Admin).await;
        let session = resolver.resolve(&token).await.unwrap().unwrap();
        assert_eq!(session.subject_id, user.id);
        assert_eq!(session.role, Role::Admin);
    }

    #[tokio::test]
    async fn demoted_account_loses_its_session() {
        let (resolver, identities, mut user, token) = setup(Role::Admin).await;
        user.role = Role::User;
        identities.update(user).await.unwrap();

        assert_eq!(resolver.resolve(&token).await, Ok(None));
    }

    #[tokio::test]
    async fn missing_record_keeps_the_session() {
        let (resolver, identities, user, token) = setup(Role::User).await;
        identities.delete(user.id).await.unwrap();

        assert!(resolver.resolve(&token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn invalid_token_never_touches_the_store() {
        let (resolver, _, _, _) = setup(Role::User).await;
        assert_eq!(resolver.resolve("garbage").await, Ok(None));
    }
}

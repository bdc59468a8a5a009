//! Session resolution: credential → optional [`Session`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::{Role, Session, SessionTokens};

/// The verifier could not give an answer (as opposed to answering "no").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("session verifier unavailable: {0}")]
    Unavailable(String),
}

/// Resolves an opaque credential into a caller session.
///
/// Implementations must treat malformed, expired or unrecognised credentials
/// as `Ok(None)`. `Err` is reserved for "could not check", e.g. the verifier
/// backend being unreachable.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, credential: &str) -> Result<Option<Session>, ResolveError>;
}

#[async_trait]
impl<R> SessionResolver for Arc<R>
where
    R: SessionResolver + ?Sized,
{
    async fn resolve(&self, credential: &str) -> Result<Option<Session>, ResolveError> {
        (**self).resolve(credential).await
    }
}

/// Resolver backed by locally verified HS256 session tokens.
#[derive(Debug, Clone)]
pub struct TokenSessionResolver {
    tokens: SessionTokens,
}

impl TokenSessionResolver {
    pub fn new(tokens: SessionTokens) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl SessionResolver for TokenSessionResolver {
    async fn resolve(&self, credential: &str) -> Result<Option<Session>, ResolveError> {
        let claims = match self.tokens.verify(credential, Utc::now()) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "session token rejected");
                return Ok(None);
            }
        };

        let role: Role = match claims.role.parse() {
            Ok(r) => r,
            Err(e) => {
                tracing::info!(subject_id = %claims.sub, error = %e, "session carries unknown role");
                return Ok(None);
            }
        };

        Ok(claims
            .expires_at()
            .map(|expires_at| Session::new(claims.sub, role, expires_at)))
    }
}

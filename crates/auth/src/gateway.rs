//! Authorization gateway: resolve the session, apply the role policy, and only
//! then run the protected operation.
//!
//! The gateway is transport-agnostic. The HTTP layer decides how a [`Denial`]
//! is rendered (status code for API routes, redirect for pages).

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use thiserror::Error;

use crate::policy::{AuthorizationDecision, evaluate};
use crate::{Role, RoleRequirement, Session, SessionResolver};

/// Upper bound on a single session resolution.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(2);

/// A protected call site and the roles it admits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: &'static str,
    pub requirement: RoleRequirement,
}

impl EntryPoint {
    pub fn new(name: &'static str, requirement: impl Into<RoleRequirement>) -> Self {
        Self {
            name,
            requirement: requirement.into(),
        }
    }
}

/// Why a guarded operation was not run.
///
/// Every variant except `Forbidden` means "treat the caller as signed out".
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    #[error("no resolvable session")]
    Unauthenticated,

    /// The verifier timed out, failed or panicked.
    #[error("session could not be verified")]
    ResolutionFailed,

    #[error("role '{0}' is not accepted here")]
    Forbidden(Role),

    /// Session is valid but its subject no longer exists in storage.
    #[error("session subject has no backing record")]
    BackingRecordMissing,
}

impl Denial {
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, Denial::Forbidden(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Denial::Unauthenticated => "unauthenticated",
            Denial::ResolutionFailed => "resolution_failed",
            Denial::Forbidden(_) => "forbidden",
            Denial::BackingRecordMissing => "backing_record_missing",
        }
    }
}

enum Resolution {
    Session(Session),
    Anonymous,
    Unavailable,
}

/// Session-scoped authorization gateway.
///
/// Holds no per-request state; one instance is shared by every entry point
/// and concurrent invocations never observe each other.
#[derive(Clone)]
pub struct Gateway {
    resolver: Arc<dyn SessionResolver>,
    resolve_timeout: Duration,
}

impl Gateway {
    pub fn new(resolver: Arc<dyn SessionResolver>) -> Self {
        Self {
            resolver,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn resolve_timeout(&self) -> Duration {
        self.resolve_timeout
    }

    /// Decide whether the caller presenting `credential` may enter `entry`.
    pub async fn authorize(&self, entry: &EntryPoint, credential: Option<&str>) -> AuthorizationDecision {
        match self.admit(entry, credential).await {
            Ok(session) => AuthorizationDecision::Allowed {
                subject_id: session.subject_id,
                role: session.role,
            },
            Err(Denial::Forbidden(role)) => AuthorizationDecision::DeniedForbidden { role },
            Err(_) => AuthorizationDecision::DeniedUnauthenticated,
        }
    }

    /// Run `operation` with the caller's session if `entry` admits it.
    ///
    /// On denial `operation` is dropped without being called. On success its
    /// output is returned untouched.
    pub async fn guard<F, Fut, T>(
        &self,
        entry: &EntryPoint,
        credential: Option<&str>,
        operation: F,
    ) -> Result<T, Denial>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = T>,
    {
        let session = self.admit(entry, credential).await?;
        Ok(operation(session).await)
    }

    async fn admit(&self, entry: &EntryPoint, credential: Option<&str>) -> Result<Session, Denial> {
        let resolution = self.resolve(credential).await;
        let unavailable = matches!(resolution, Resolution::Unavailable);
        let session = match resolution {
            Resolution::Session(s) => Some(s),
            Resolution::Anonymous | Resolution::Unavailable => None,
        };

        let denial = match (evaluate(&entry.requirement, session.as_ref()), session) {
            (AuthorizationDecision::Allowed { subject_id, role }, Some(session)) => {
                tracing::debug!(entry = entry.name, %subject_id, %role, "access allowed");
                return Ok(session);
            }
            (AuthorizationDecision::DeniedForbidden { role }, _) => Denial::Forbidden(role),
            _ if unavailable => Denial::ResolutionFailed,
            _ => Denial::Unauthenticated,
        };

        tracing::info!(entry = entry.name, denial = denial.kind(), "access denied");
        Err(denial)
    }

    /// Bounded, fail-closed session resolution.
    async fn resolve(&self, credential: Option<&str>) -> Resolution {
        let Some(credential) = credential.filter(|c| !c.is_empty()) else {
            return Resolution::Anonymous;
        };

        let attempt = AssertUnwindSafe(self.resolver.resolve(credential)).catch_unwind();
        match tokio::time::timeout(self.resolve_timeout, attempt).await {
            Ok(Ok(Ok(Some(session)))) if session.is_valid_at(Utc::now()) => Resolution::Session(session),
            Ok(Ok(Ok(_))) => Resolution::Anonymous,
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "session resolution failed; failing closed");
                Resolution::Unavailable
            }
            Ok(Err(_)) => {
                tracing::error!("session resolver panicked; failing closed");
                Resolution::Unavailable
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.resolve_timeout.as_millis() as u64,
                    "session resolution timed out; failing closed"
                );
                Resolution::Unavailable
            }
        }
    }
}

impl core::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gateway")
            .field("resolve_timeout", &self.resolve_timeout)
            .finish_non_exhaustive()
    }
}

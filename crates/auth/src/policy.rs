//! Role policy: the pure allow/deny decision.

use serde::Serialize;

use storefront_core::SubjectId;

use crate::{Role, RoleRequirement, Session};

/// Outcome of evaluating a requirement against a (possibly absent) session.
///
/// Computed fresh for every request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AuthorizationDecision {
    Allowed { subject_id: SubjectId, role: Role },
    DeniedUnauthenticated,
    DeniedForbidden { role: Role },
}

impl AuthorizationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthorizationDecision::Allowed { .. })
    }
}

/// Evaluate `required` against the caller's session.
///
/// - No IO
/// - No panics
/// - An absent session is denied before any role comparison happens
pub fn evaluate(required: &RoleRequirement, actual: Option<&Session>) -> AuthorizationDecision {
    let Some(session) = actual else {
        return AuthorizationDecision::DeniedUnauthenticated;
    };

    if required.accepts(session.role) {
        AuthorizationDecision::Allowed {
            subject_id: session.subject_id,
            role: session.role,
        }
    } else {
        AuthorizationDecision::DeniedForbidden { role: session.role }
    }
}

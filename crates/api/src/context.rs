use storefront_auth::{Role, Session, SubjectId, User};

/// Caller identity for a request that passed a guard.
///
/// Inserted into request extensions by the guard middleware; handlers behind
/// a guard can rely on it being present.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    subject_id: SubjectId,
    role: Role,
}

impl SessionContext {
    pub fn new(subject_id: SubjectId, role: Role) -> Self {
        Self { subject_id, role }
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl From<&Session> for SessionContext {
    fn from(session: &Session) -> Self {
        Self::new(session.subject_id, session.role)
    }
}

/// Backing identity record, attached by page guards after the lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub User);

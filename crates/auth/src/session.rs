use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::SubjectId;

use crate::Role;

/// A resolved caller session.
///
/// Sessions are issued elsewhere (sign-in) and are read-only here. Only the
/// subject, the role claim and the validity window are consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub subject_id: SubjectId,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(subject_id: SubjectId, role: Role, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject_id,
            role,
            expires_at,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

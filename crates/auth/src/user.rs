//! Identity records: the persisted user a session subject refers to.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storefront_core::{DomainError, DomainResult, SubjectId};

use crate::Role;

const MAX_NAME_LEN: usize = 120;

/// A persisted identity.
///
/// `password_hash` is a PHC string (see [`crate::password`]) and must never be
/// serialized into responses; API layers map users to their own DTOs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: SubjectId,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a user. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

impl User {
    pub fn new(
        id: SubjectId,
        email: &str,
        name: &str,
        role: Role,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            email: normalize_email(email)?,
            name: validate_name(name)?,
            role,
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply `patch`, validating every provided field before changing anything.
    pub fn apply_patch(&mut self, patch: UserPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let email = patch.email.as_deref().map(normalize_email).transpose()?;
        let name = patch.name.as_deref().map(validate_name).transpose()?;

        if let Some(email) = email {
            self.email = email;
        }
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(hash) = patch.password_hash {
            self.password_hash = hash;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Trim and lower-case an email, rejecting obviously malformed values.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) => {
            Ok(email)
        }
        _ => Err(DomainError::validation("email must look like local@domain")),
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!("name must be at most {MAX_NAME_LEN} characters")));
    }
    Ok(name.to_string())
}

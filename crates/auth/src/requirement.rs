use std::collections::BTreeSet;

use crate::Role;

/// The set of roles an entry point accepts.
///
/// Fixed when the entry point is registered and never mutated afterwards.
/// Membership is the only comparison: a hierarchy ("admins can do anything a
/// user can") is expressed by listing both roles explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRequirement {
    accepted: BTreeSet<Role>,
}

impl RoleRequirement {
    /// Accept exactly one role.
    pub fn only(role: Role) -> Self {
        Self {
            accepted: BTreeSet::from([role]),
        }
    }

    /// Accept any of the given roles.
    ///
    /// An empty set is allowed and admits nobody.
    pub fn any_of(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            accepted: roles.into_iter().collect(),
        }
    }

    pub fn accepts(&self, role: Role) -> bool {
        self.accepted.contains(&role)
    }

    pub fn accepted(&self) -> impl Iterator<Item = Role> + '_ {
        self.accepted.iter().copied()
    }
}

impl From<Role> for RoleRequirement {
    fn from(role: Role) -> Self {
        Self::only(role)
    }
}

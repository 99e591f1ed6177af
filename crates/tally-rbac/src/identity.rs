//! Authenticated caller identities.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Stable identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An authenticated caller and the roles assigned to them.
///
/// Built by the authentication layer for a single request and dropped when
/// the request completes. The access decision engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Who the caller is.
    pub user_id: UserId,
    /// Roles assigned to the caller.
    pub roles: BTreeSet<Role>,
}

impl Identity {
    /// Creates an identity with the given roles.
    pub fn new(user_id: impl Into<UserId>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Creates an identity with no roles. It is authenticated but can do nothing.
    pub fn without_roles(user_id: impl Into<UserId>) -> Self {
        Self::new(user_id, std::iter::empty())
    }

    /// Returns whether the caller holds `role`.
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_roles_are_a_set() {
        let identity = Identity::new(
            "1",
            [Role::from("admin"), Role::from("admin"), Role::from("user")],
        );

        assert_eq!(identity.roles.len(), 2);
        assert!(identity.has_role(&Role::from("admin")));
        assert!(!identity.has_role(&Role::from("auditor")));
    }

    #[test]
    fn test_identity_without_roles() {
        let identity = Identity::without_roles("anon");
        assert_eq!(identity.user_id.as_str(), "anon");
        assert!(identity.roles.is_empty());
    }
}

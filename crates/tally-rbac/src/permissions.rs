//! Permission types for access control.
//!
//! Permissions are opaque names for gated actions. The counter service uses
//! two of them, [`Permission::READ`] and [`Permission::INCREMENT`], but the
//! registry accepts any name so configurations can carry permissions that no
//! operation checks yet.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Permission that can be granted to a role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Read the current counter value.
    pub const READ: Permission = Permission(Cow::Borrowed("read"));

    /// Add a non-negative delta to the counter.
    pub const INCREMENT: Permission = Permission(Cow::Borrowed("increment"));

    /// Creates a permission from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the permission name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Set of permissions granted to a role, or held by an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// Creates a permission set. Duplicates collapse.
    pub fn new(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Creates an empty permission set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns whether this set contains the given permission.
    pub fn contains(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Adds every permission of `other` to this set.
    pub fn extend_from(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Returns all permissions in the set, in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Permission>> for PermissionSet {
    fn from(permissions: Vec<Permission>) -> Self {
        Self::new(permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_permissions() {
        assert_eq!(Permission::READ.as_str(), "read");
        assert_eq!(Permission::INCREMENT.as_str(), "increment");
        assert_eq!(Permission::READ, Permission::new("read"));
    }

    #[test]
    fn test_permission_set_operations() {
        let mut set = PermissionSet::empty();
        assert!(!set.contains(&Permission::READ));
        assert!(set.is_empty());

        set.extend_from(&PermissionSet::from(vec![Permission::READ]));
        assert!(set.contains(&Permission::READ));

        // Duplicate grant is a no-op
        set.extend_from(&PermissionSet::from(vec![Permission::READ]));
        assert_eq!(set.len(), 1);

        set.extend_from(&PermissionSet::from(vec![Permission::INCREMENT]));
        assert!(set.contains(&Permission::INCREMENT));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_permission_set_from_vec_dedups() {
        let set = PermissionSet::from(vec![
            Permission::READ,
            Permission::new("read"),
            Permission::INCREMENT,
        ]);

        assert_eq!(set.len(), 2);
        assert!(set.contains(&Permission::READ));
        assert!(!set.contains(&Permission::new("delete")));
    }

    #[test]
    fn test_permission_set_iterates_in_name_order() {
        let set: PermissionSet = ["read", "increment", "audit"]
            .into_iter()
            .map(Permission::from)
            .collect();

        let names: Vec<&str> = set.iter().map(Permission::as_str).collect();
        assert_eq!(names, vec!["audit", "increment", "read"]);
    }
}

//! The role-permission registry.
//!
//! Built once at startup from configuration and read-only afterwards. No
//! `grant`/`revoke` exists; changing the role model means building a new
//! registry.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::permissions::{Permission, PermissionSet};
use crate::roles::Role;

/// Error raised when a role mapping is malformed.
///
/// These are configuration errors and are fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A role has an empty name.
    #[error("role name must not be empty")]
    EmptyRole,

    /// A role lists a permission with an empty name.
    #[error("role '{role}' lists an empty permission")]
    EmptyPermission { role: Role },

    /// Two permissions of one role differ only in case.
    #[error("role '{role}' lists permissions '{first}' and '{second}' that differ only in case")]
    ConflictingPermissionCase {
        role: Role,
        first: Permission,
        second: Permission,
    },

    /// Two roles differ only in case.
    #[error("roles '{first}' and '{second}' differ only in case")]
    ConflictingRoleCase { first: Role, second: Role },
}

/// Result type for registry construction.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Immutable mapping from role to the permissions it grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRegistry {
    grants: BTreeMap<Role, PermissionSet>,
}

impl RoleRegistry {
    /// Builds a registry from a role -> permission-names mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_rbac::{Permission, Role, RoleRegistry};
    ///
    /// let registry = RoleRegistry::from_mapping([
    ///     ("admin", vec!["increment", "read"]),
    ///     ("user", vec!["read"]),
    /// ])?;
    ///
    /// assert!(registry.permissions_of(&Role::from("admin")).contains(&Permission::INCREMENT));
    /// assert!(registry.permissions_of(&Role::from("nobody")).is_empty());
    /// # Ok::<(), tally_rbac::RegistryError>(())
    /// ```
    pub fn from_mapping<R, P, I>(mapping: impl IntoIterator<Item = (R, I)>) -> Result<Self>
    where
        R: Into<Role>,
        P: Into<Permission>,
        I: IntoIterator<Item = P>,
    {
        let mut grants = BTreeMap::new();
        // Lowercased role name -> first spelling seen.
        let mut folded_roles: HashMap<String, Role> = HashMap::new();

        for (role, permissions) in mapping {
            let role: Role = role.into();
            if role.is_blank() {
                return Err(RegistryError::EmptyRole);
            }

            if let Some(existing) = folded_roles.get(&role.as_str().to_ascii_lowercase()) {
                if *existing != role {
                    return Err(RegistryError::ConflictingRoleCase {
                        first: existing.clone(),
                        second: role,
                    });
                }
            }
            folded_roles.insert(role.as_str().to_ascii_lowercase(), role.clone());

            let set = build_permission_set(&role, permissions)?;
            grants
                .entry(role)
                .or_insert_with(PermissionSet::empty)
                .extend_from(&set);
        }

        Ok(Self { grants })
    }

    /// Returns the permissions granted by `role`.
    ///
    /// An unknown role grants nothing; this is not an error.
    pub fn permissions_of(&self, role: &Role) -> PermissionSet {
        self.grants.get(role).cloned().unwrap_or_default()
    }

    /// Returns whether `role` grants `permission`, without cloning the set.
    pub fn grants(&self, role: &Role, permission: &Permission) -> bool {
        self.grants
            .get(role)
            .is_some_and(|set| set.contains(permission))
    }

    /// Returns whether any configured role grants `permission`.
    pub fn grants_anywhere(&self, permission: &Permission) -> bool {
        self.grants.values().any(|set| set.contains(permission))
    }

    /// Returns whether `role` is configured.
    pub fn contains_role(&self, role: &Role) -> bool {
        self.grants.contains_key(role)
    }

    /// Iterates over configured roles and their grants, in role name order.
    pub fn roles(&self) -> impl Iterator<Item = (&Role, &PermissionSet)> {
        self.grants.iter()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

fn build_permission_set<P: Into<Permission>>(
    role: &Role,
    permissions: impl IntoIterator<Item = P>,
) -> Result<PermissionSet> {
    let mut folded: HashMap<String, Permission> = HashMap::new();
    let mut accepted = Vec::new();

    for permission in permissions {
        let permission: Permission = permission.into();
        if permission.is_blank() {
            return Err(RegistryError::EmptyPermission { role: role.clone() });
        }

        let key = permission.as_str().to_ascii_lowercase();
        match folded.get(&key) {
            Some(existing) if *existing == permission => {}
            Some(existing) => {
                return Err(RegistryError::ConflictingPermissionCase {
                    role: role.clone(),
                    first: existing.clone(),
                    second: permission,
                });
            }
            None => {
                folded.insert(key, permission.clone());
                accepted.push(permission);
            }
        }
    }

    Ok(PermissionSet::new(accepted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_registry() -> RoleRegistry {
        RoleRegistry::from_mapping([
            ("admin", vec!["increment", "read"]),
            ("user", vec!["read"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_permissions_of_known_role() {
        let registry = standard_registry();

        let admin = registry.permissions_of(&Role::from("admin"));
        assert!(admin.contains(&Permission::READ));
        assert!(admin.contains(&Permission::INCREMENT));

        let user = registry.permissions_of(&Role::from("user"));
        assert!(user.contains(&Permission::READ));
        assert!(!user.contains(&Permission::INCREMENT));
    }

    #[test]
    fn test_unknown_role_grants_nothing() {
        let registry = standard_registry();
        assert!(registry.permissions_of(&Role::from("guest")).is_empty());
        assert!(!registry.grants(&Role::from("guest"), &Permission::READ));
        assert!(!registry.contains_role(&Role::from("guest")));
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let registry =
            RoleRegistry::from_mapping([("user", vec!["read", "read", "read"])]).unwrap();
        assert_eq!(registry.permissions_of(&Role::from("user")).len(), 1);
    }

    #[test]
    fn test_conflicting_permission_case_rejected() {
        let err = RoleRegistry::from_mapping([("admin", vec!["read", "READ"])]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::ConflictingPermissionCase {
                role: Role::from("admin"),
                first: Permission::from("read"),
                second: Permission::from("READ"),
            }
        );
    }

    #[test]
    fn test_conflicting_role_case_rejected() {
        let err = RoleRegistry::from_mapping([("admin", vec!["read"]), ("Admin", vec!["read"])])
            .unwrap_err();
        assert!(matches!(err, RegistryError::ConflictingRoleCase { .. }));
    }

    #[test]
    fn test_blank_names_rejected() {
        assert_eq!(
            RoleRegistry::from_mapping([(" ", vec!["read"])]).unwrap_err(),
            RegistryError::EmptyRole
        );
        assert_eq!(
            RoleRegistry::from_mapping([("user", vec![""])]).unwrap_err(),
            RegistryError::EmptyPermission {
                role: Role::from("user")
            }
        );
    }

    #[test]
    fn test_role_with_no_permissions_is_valid() {
        let registry = RoleRegistry::from_mapping([("inert", Vec::<&str>::new())]).unwrap();
        assert!(registry.contains_role(&Role::from("inert")));
        assert!(registry.permissions_of(&Role::from("inert")).is_empty());
    }

    #[test]
    fn test_grants_anywhere() {
        let registry = standard_registry();
        assert!(registry.grants_anywhere(&Permission::INCREMENT));
        assert!(!registry.grants_anywhere(&Permission::from("delete")));
    }

    #[test]
    fn test_roles_iterate_in_name_order() {
        let registry = standard_registry();
        let names: Vec<&str> = registry.roles().map(|(role, _)| role.as_str()).collect();
        assert_eq!(names, vec!["admin", "user"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }
}

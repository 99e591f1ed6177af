//! Access decisions.
//!
//! [`authorize`] is the decision procedure: a pure function of the caller's
//! roles and the registry. [`AccessEnforcer`] wraps it with a shared registry
//! and audit logging for use at request boundaries.

use std::fmt::{self, Display};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::identity::Identity;
use crate::permissions::{Permission, PermissionSet};
use crate::registry::RoleRegistry;

/// Outcome of an access decision.
///
/// None of these are errors. `Deny` and `MissingIdentity` are expected,
/// frequent outcomes that callers map to client responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The caller holds the required permission.
    Allow,
    /// The caller is authenticated but lacks the required permission.
    Deny,
    /// No authenticated caller was supplied.
    MissingIdentity,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Stable lowercase label, used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
            Decision::MissingIdentity => "missing_identity",
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether `identity` may exercise `required`.
///
/// Allows iff `required` is in the union of the permission sets of the
/// identity's roles. An absent identity yields [`Decision::MissingIdentity`].
/// Total, deterministic, and free of side effects.
///
/// # Examples
///
/// ```
/// use tally_rbac::{authorize, Decision, Identity, Permission, Role, RoleRegistry};
///
/// let registry = RoleRegistry::from_mapping([
///     ("admin", vec!["increment", "read"]),
///     ("user", vec!["read"]),
/// ])?;
///
/// let user = Identity::new("2", [Role::from("user")]);
/// assert_eq!(authorize(&registry, Some(&user), &Permission::READ), Decision::Allow);
/// assert_eq!(authorize(&registry, Some(&user), &Permission::INCREMENT), Decision::Deny);
/// assert_eq!(authorize(&registry, None, &Permission::READ), Decision::MissingIdentity);
/// # Ok::<(), tally_rbac::RegistryError>(())
/// ```
pub fn authorize(
    registry: &RoleRegistry,
    identity: Option<&Identity>,
    required: &Permission,
) -> Decision {
    let Some(identity) = identity else {
        return Decision::MissingIdentity;
    };

    // Membership in the union is membership in any one set.
    if identity
        .roles
        .iter()
        .any(|role| registry.grants(role, required))
    {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Returns the union of the permissions granted by all of the identity's roles.
pub fn effective_permissions(registry: &RoleRegistry, identity: &Identity) -> PermissionSet {
    let mut effective = PermissionSet::empty();
    for role in &identity.roles {
        effective.extend_from(&registry.permissions_of(role));
    }
    effective
}

/// Policy enforcement engine.
///
/// Holds the shared registry and records every decision as an audit event.
/// Cloning is cheap; clones share the registry.
#[derive(Debug, Clone)]
pub struct AccessEnforcer {
    registry: Arc<RoleRegistry>,

    /// Whether to log access decisions.
    audit_enabled: bool,
}

impl AccessEnforcer {
    /// Creates a new enforcer over `registry`.
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self {
            registry,
            audit_enabled: true,
        }
    }

    /// Disables audit logging (for testing).
    #[must_use]
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    /// Decides and, when auditing, logs the decision.
    ///
    /// **Audit:** grants at `info`, denials and missing identities at `warn`.
    pub fn authorize(&self, identity: Option<&Identity>, required: &Permission) -> Decision {
        let decision = authorize(&self.registry, identity, required);

        if self.audit_enabled {
            let user_id = identity.map_or("<none>", |i| i.user_id.as_str());
            match decision {
                Decision::Allow => info!(
                    user_id = %user_id,
                    permission = %required,
                    decision = %decision,
                    "Access granted"
                ),
                Decision::Deny => warn!(
                    user_id = %user_id,
                    permission = %required,
                    roles = ?identity.map(|i| &i.roles),
                    decision = %decision,
                    "Access denied"
                ),
                Decision::MissingIdentity => warn!(
                    permission = %required,
                    decision = %decision,
                    "Access attempted without identity"
                ),
            }
        }

        decision
    }

    /// Returns the registry this enforcer decides against.
    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use proptest::prelude::*;

    fn standard_registry() -> RoleRegistry {
        RoleRegistry::from_mapping([
            ("admin", vec!["increment", "read"]),
            ("user", vec!["read"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_admin_allowed_everything_configured() {
        let registry = standard_registry();
        let admin = Identity::new("1", [Role::from("admin")]);

        assert_eq!(
            authorize(&registry, Some(&admin), &Permission::READ),
            Decision::Allow
        );
        assert_eq!(
            authorize(&registry, Some(&admin), &Permission::INCREMENT),
            Decision::Allow
        );
    }

    #[test]
    fn test_user_denied_increment() {
        let registry = standard_registry();
        let user = Identity::new("2", [Role::from("user")]);

        assert_eq!(
            authorize(&registry, Some(&user), &Permission::INCREMENT),
            Decision::Deny
        );
    }

    #[test]
    fn test_empty_role_set_denied() {
        let registry = standard_registry();
        let nobody = Identity::without_roles("3");

        assert_eq!(
            authorize(&registry, Some(&nobody), &Permission::READ),
            Decision::Deny
        );
        assert_eq!(
            authorize(&registry, Some(&nobody), &Permission::INCREMENT),
            Decision::Deny
        );
    }

    #[test]
    fn test_missing_identity_is_distinct_from_deny() {
        let registry = standard_registry();
        let decision = authorize(&registry, None, &Permission::READ);

        assert_eq!(decision, Decision::MissingIdentity);
        assert_ne!(decision, Decision::Deny);
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_unknown_roles_contribute_nothing() {
        let registry = standard_registry();
        let identity = Identity::new("4", [Role::from("ghost"), Role::from("user")]);

        assert_eq!(
            authorize(&registry, Some(&identity), &Permission::READ),
            Decision::Allow
        );
        assert_eq!(
            authorize(&registry, Some(&identity), &Permission::INCREMENT),
            Decision::Deny
        );
    }

    #[test]
    fn test_effective_permissions_is_union() {
        let registry = RoleRegistry::from_mapping([
            ("reader", vec!["read"]),
            ("bumper", vec!["increment"]),
        ])
        .unwrap();
        let identity = Identity::new("5", [Role::from("reader"), Role::from("bumper")]);

        let effective = effective_permissions(&registry, &identity);
        assert_eq!(effective.len(), 2);
        assert_eq!(
            authorize(&registry, Some(&identity), &Permission::INCREMENT),
            Decision::Allow
        );
    }

    #[test]
    fn test_enforcer_matches_pure_function() {
        let registry = Arc::new(standard_registry());
        let enforcer = AccessEnforcer::new(Arc::clone(&registry)).without_audit();
        let user = Identity::new("2", [Role::from("user")]);

        for permission in [Permission::READ, Permission::INCREMENT] {
            assert_eq!(
                enforcer.authorize(Some(&user), &permission),
                authorize(&registry, Some(&user), &permission)
            );
        }
        assert_eq!(
            enforcer.authorize(None, &Permission::READ),
            Decision::MissingIdentity
        );
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(Decision::Allow.to_string(), "allow");
        assert_eq!(Decision::Deny.to_string(), "deny");
        assert_eq!(Decision::MissingIdentity.to_string(), "missing_identity");
    }

    fn name() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    fn mapping() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
        prop::collection::btree_map(name(), prop::collection::btree_set(name(), 0..5), 0..6)
            .prop_map(|m| {
                m.into_iter()
                    .map(|(role, perms)| (role, perms.into_iter().collect()))
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn granted_permission_is_always_allowed(mapping in mapping()) {
            let registry = RoleRegistry::from_mapping(mapping.clone()).unwrap();

            for (role, permissions) in &mapping {
                let identity = Identity::new("p", [Role::from(role.as_str())]);
                for permission in permissions {
                    prop_assert_eq!(
                        authorize(&registry, Some(&identity), &Permission::from(permission.as_str())),
                        Decision::Allow
                    );
                }
            }
        }

        #[test]
        fn empty_roles_always_denied(mapping in mapping(), permission in name()) {
            let registry = RoleRegistry::from_mapping(mapping).unwrap();
            let identity = Identity::without_roles("p");

            prop_assert_eq!(
                authorize(&registry, Some(&identity), &Permission::from(permission)),
                Decision::Deny
            );
        }

        #[test]
        fn ungranted_permission_denied_for_everyone(
            mapping in mapping(),
            roles in prop::collection::btree_set(name(), 0..4),
        ) {
            let registry = RoleRegistry::from_mapping(mapping).unwrap();
            // Uppercase names never appear in the generated mapping.
            let permission = Permission::from("NEVER_GRANTED");
            let identity = Identity::new("p", roles.into_iter().map(Role::from));

            prop_assert_eq!(
                authorize(&registry, Some(&identity), &permission),
                Decision::Deny
            );
        }
    }
}

//! Role identifiers.
//!
//! A role is an opaque name. What it grants is decided entirely by the
//! [`RoleRegistry`](crate::registry::RoleRegistry); the name itself carries no
//! privilege, so `"admin"` and `"user"` are only conventions of the default
//! configuration.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Role in the access control system.
///
/// Role names are compared byte-for-byte. The registry rejects configurations
/// where two roles differ only in ASCII case, so lookups never have to guess.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Creates a role from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the role name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the name is empty or only whitespace.
    pub(crate) fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display_round_trips_name() {
        let role = Role::new("admin");
        assert_eq!(role.to_string(), "admin");
        assert_eq!(role.as_str(), "admin");
    }

    #[test]
    fn test_role_comparison_is_case_sensitive() {
        assert_ne!(Role::from("admin"), Role::from("Admin"));
    }

    #[test]
    fn test_blank_role() {
        assert!(Role::new("").is_blank());
        assert!(Role::new("  \t").is_blank());
        assert!(!Role::new("user").is_blank());
    }
}

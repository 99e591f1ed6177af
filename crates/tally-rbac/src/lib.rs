//! # tally-rbac: Role-Based Access Control
//!
//! Decides whether an authenticated caller may read or increment the counter.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Identity { user_id, roles }                 │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  authorize / AccessEnforcer                  │
//! │  ├─ union of role grants (RoleRegistry)      │
//! │  └─ Allow | Deny | MissingIdentity           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The registry is immutable once built and the decision is a pure function,
//! so both are shared freely across request handlers without locks.
//!
//! ## Default roles
//!
//! | Role  | read | increment |
//! |-------|------|-----------|
//! | admin | ✓    | ✓         |
//! | user  | ✓    | ✗         |
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tally_rbac::{AccessEnforcer, Decision, Identity, Permission, Role, RoleRegistry};
//!
//! let registry = Arc::new(RoleRegistry::from_mapping([
//!     ("admin", vec!["increment", "read"]),
//!     ("user", vec!["read"]),
//! ])?);
//! let enforcer = AccessEnforcer::new(registry);
//!
//! let user = Identity::new("2", [Role::from("user")]);
//! assert_eq!(enforcer.authorize(Some(&user), &Permission::INCREMENT), Decision::Deny);
//! # Ok::<(), tally_rbac::RegistryError>(())
//! ```

pub mod enforcement;
pub mod identity;
pub mod permissions;
pub mod registry;
pub mod roles;

// Re-export commonly used types
pub use enforcement::{AccessEnforcer, Decision, authorize, effective_permissions};
pub use identity::{Identity, UserId};
pub use permissions::{Permission, PermissionSet};
pub use registry::{RegistryError, RoleRegistry};
pub use roles::Role;

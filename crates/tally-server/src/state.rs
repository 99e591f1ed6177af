//! Shared state for all HTTP handlers.

use std::sync::Arc;

use tally_config::TallyConfig;
use tally_counter::Counter;
use tally_rbac::{AccessEnforcer, Decision, Identity, Permission, RoleRegistry};
use tracing::{info, warn};

use crate::auth::UserDirectory;
use crate::error::{ApiError, ServerResult};
use crate::metrics::Metrics;

/// Shared state for all handlers. Cloning shares everything.
#[derive(Debug, Clone)]
pub struct AppState {
    enforcer: AccessEnforcer,
    counter: Arc<Counter>,
    directory: Arc<UserDirectory>,
    metrics: Metrics,
}

impl AppState {
    /// Creates state from already-built parts.
    pub fn new(
        registry: RoleRegistry,
        counter: Arc<Counter>,
        directory: UserDirectory,
    ) -> ServerResult<Self> {
        Ok(Self {
            enforcer: AccessEnforcer::new(Arc::new(registry)),
            counter,
            directory: Arc::new(directory),
            metrics: Metrics::new()?,
        })
    }

    /// Builds the registry, a fresh counter at zero, and the user directory
    /// from configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate or the role mapping is
    /// malformed.
    pub fn from_config(config: &TallyConfig) -> ServerResult<Self> {
        config.validate()?;
        let registry = RoleRegistry::from_mapping(config.roles.clone())?;
        let directory = UserDirectory::from_users(&config.users)?;

        for permission in [Permission::READ, Permission::INCREMENT] {
            if !registry.grants_anywhere(&permission) {
                warn!(%permission, "no role grants this permission; every request for it will be denied");
            }
        }
        for user in &config.users {
            for role in &user.roles {
                if !registry.contains_role(&role.as_str().into()) {
                    warn!(user_id = %user.id, %role, "user holds a role that is not configured");
                }
            }
        }

        info!(
            roles = registry.len(),
            users = directory.len(),
            "access control initialized"
        );

        Self::new(registry, Arc::new(Counter::new()), directory)
    }

    /// Returns a copy whose enforcer does not emit audit logs.
    #[must_use]
    pub fn without_audit(mut self) -> Self {
        self.enforcer = self.enforcer.without_audit();
        self
    }

    /// Decides access, records it, and maps refusals to errors.
    pub fn require(
        &self,
        identity: Option<&Identity>,
        permission: &Permission,
    ) -> Result<(), ApiError> {
        let decision = self.enforcer.authorize(identity, permission);
        self.metrics.record_decision(permission, decision);

        match decision {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(ApiError::Forbidden {
                permission: permission.clone(),
            }),
            Decision::MissingIdentity => Err(ApiError::Unauthenticated),
        }
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn enforcer(&self) -> &AccessEnforcer {
        &self.enforcer
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

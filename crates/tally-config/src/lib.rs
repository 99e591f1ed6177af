//! Configuration management for Tally
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the caller)
//! 2. Environment variables (`TALLY_*` prefix, `__` between sections)
//! 3. tally.local.toml (gitignored, local overrides)
//! 4. tally.toml (git-tracked, project config)
//! 5. ~/.config/tally/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Tally configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub server: ServerConfig,
    /// Role name -> permission names.
    pub roles: BTreeMap<String, Vec<String>>,
    pub users: Vec<UserDefinition>,
}

impl Default for TallyConfig {
    fn default() -> Self {
        let mut roles = BTreeMap::new();
        roles.insert(
            "admin".to_string(),
            vec!["increment".to_string(), "read".to_string()],
        );
        roles.insert("user".to_string(), vec!["read".to_string()]);

        Self {
            server: ServerConfig::default(),
            roles,
            users: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
        }
    }
}

/// A user known to the service, from config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDefinition {
    /// Stable user id.
    pub id: String,
    /// Display name, for logs.
    #[serde(default)]
    pub name: Option<String>,
    /// Bearer token presented by this user.
    pub token: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl TallyConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Parses the configured bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_address.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "server.bind_address '{}' is not a socket address",
                self.server.bind_address
            ))
        })
    }

    /// Checks invariants that deserialization alone cannot express.
    ///
    /// Role mappings are checked separately when the registry is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        let mut ids = HashSet::new();
        let mut tokens = HashSet::new();
        for user in &self.users {
            if user.id.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "user id must not be empty".to_string(),
                ));
            }
            if user.token.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "user '{}' has an empty token",
                    user.id
                )));
            }
            if !ids.insert(user.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate user id '{}'",
                    user.id
                )));
            }
            if !tokens.insert(user.token.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "user '{}' reuses another user's token",
                    user.id
                )));
            }
        }

        Ok(())
    }

    /// Returns a copy safe to print: user tokens are replaced.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for user in &mut config.users {
            user.token = "<redacted>".to_string();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, token: &str) -> UserDefinition {
        UserDefinition {
            id: id.to_string(),
            name: None,
            token: token.to_string(),
            roles: vec!["user".to_string()],
        }
    }

    #[test]
    fn test_default_config() {
        let config = TallyConfig::default();
        assert_eq!(config.server.bind_address, "0.0.0.0:80");
        assert_eq!(config.roles["admin"], vec!["increment", "read"]);
        assert_eq!(config.roles["user"], vec!["read"]);
        assert!(config.users.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_bind_address() {
        let mut config = TallyConfig::default();
        config.server.bind_address = "not-an-address".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_duplicate_user_ids_rejected() {
        let config = TallyConfig {
            users: vec![user("1", "a"), user("1", "b")],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate user id"));
    }

    #[test]
    fn test_shared_tokens_rejected() {
        let config = TallyConfig {
            users: vec![user("1", "same"), user("2", "same")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        let config = TallyConfig {
            users: vec![user("1", "")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted_hides_tokens() {
        let config = TallyConfig {
            users: vec![user("1", "secret")],
            ..Default::default()
        };
        let redacted = config.redacted();
        assert_eq!(redacted.users[0].token, "<redacted>");
        assert_eq!(config.users[0].token, "secret");
    }
}

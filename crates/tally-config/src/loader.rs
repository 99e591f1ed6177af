//! Configuration loader with multi-source merging

use crate::{Paths, TallyConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides (`TALLY_SERVER__BIND_ADDRESS`).
const ENV_PREFIX: &str = "TALLY";

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Skip ~/.config/tally/config.toml
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<TallyConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = TallyConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. User config (~/.config/tally/config.toml)
        if self.user_config {
            if let Ok(user_config_file) = Paths::new().user_config_file() {
                if user_config_file.exists() {
                    builder = builder.add_source(
                        config::File::from(user_config_file)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // 3. Project config (tally.toml)
        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(
                config::File::from(project_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 4. Local config (tally.local.toml, gitignored)
        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(
                config::File::from(local_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 5. Environment variables (TALLY_SERVER__BIND_ADDRESS=...)
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let tally_config: TallyConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        tally_config
            .validate()
            .context("Configuration failed validation")?;

        Ok(tally_config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

//! Configuration management commands.

use std::path::Path;

use anyhow::{Context, Result};
use tally_config::{Paths, TallyConfig};
use tally_rbac::RoleRegistry;

use crate::style::info_table;

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Toml,
    Json,
}

/// Show the resolved configuration, tokens redacted.
pub fn show(project: &str, format: Format) -> Result<()> {
    let project_path = Path::new(project);
    let config = TallyConfig::load_from_dir(project_path)
        .context("Failed to load configuration")?
        .redacted();

    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        Format::Toml => {
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{toml_str}");
        }
        Format::Text => {
            println!("Tally Configuration");
            println!("===================\n");

            let source = if Paths::is_initialized(project_path) {
                Paths::project_config_file(project_path).display().to_string()
            } else {
                "built-in defaults".to_string()
            };
            println!(
                "{}",
                info_table(&[
                    ("Source", source),
                    ("Bind address", config.server.bind_address.clone()),
                ])
            );
            println!();

            println!("Roles:");
            for (role, permissions) in &config.roles {
                println!("  {role}: {}", permissions.join(", "));
            }
            println!();

            println!("Users:");
            if config.users.is_empty() {
                println!("  (none)");
            }
            for user in &config.users {
                println!(
                    "  {} ({}): roles [{}], token {}",
                    user.id,
                    user.name.as_deref().unwrap_or("unnamed"),
                    user.roles.join(", "),
                    user.token
                );
            }
        }
    }

    Ok(())
}

/// Validate configuration files, including the role mapping.
pub fn validate(project: &str) -> Result<()> {
    let project_path = Path::new(project);

    println!("Validating configuration in {}...", project_path.display());

    let result = TallyConfig::load_from_dir(project_path).and_then(|config| {
        RoleRegistry::from_mapping(config.roles).context("Invalid role configuration")?;
        Ok(())
    });

    match result {
        Ok(()) => {
            println!("✓ Configuration is valid");
            Ok(())
        }
        Err(e) => {
            println!("✗ Configuration validation failed:");
            println!("  {e:#}");
            Err(e)
        }
    }
}

//! Tally CLI.
//!
//! A shared counter behind role-based access control.
//!
//! # Quick Start
//!
//! ```bash
//! # Inspect the roles the server will enforce
//! tally roles --project .
//!
//! # Start the server on port 8080
//! tally start --project . --address 8080
//!
//! # Read the counter (new terminal)
//! curl -H "Authorization: Bearer $TOKEN" http://127.0.0.1:8080/
//! ```

mod commands;
mod style;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::config::Format;

/// Tally - a shared counter behind role-based access control.
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Start the counter server.
    Start {
        /// Project directory containing tally.toml.
        #[arg(short, long, default_value = ".")]
        project: String,

        /// Address to bind to (port only: 8080, or full: 0.0.0.0:8080).
        /// Overrides server.bind_address from configuration.
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Show configured roles and their permissions.
    Roles {
        /// Project directory containing tally.toml.
        #[arg(short, long, default_value = ".")]
        project: String,
    },

    /// Configuration management commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration (tokens redacted).
    Show {
        /// Project directory containing tally.toml.
        #[arg(short, long, default_value = ".")]
        project: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Validate configuration files.
    Validate {
        /// Project directory containing tally.toml.
        #[arg(short, long, default_value = ".")]
        project: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();
    style::set_no_color(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Start { project, address } => {
            commands::start::run(&project, address.as_deref())
        }
        Commands::Roles { project } => commands::roles::run(&project),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { project, format } => commands::config::show(&project, format),
            ConfigCommands::Validate { project } => commands::config::validate(&project),
        },
    }
}

/// Builds the log filter from `RUST_LOG` directives, falling back to `info`
/// when they are absent or do not parse.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_log_filter_honours_bare_level() {
        assert_eq!(
            log_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(Some("warn")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }

    #[test]
    fn test_log_filter_honours_targets() {
        assert_eq!(
            log_filter(Some("tally_server=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }
}

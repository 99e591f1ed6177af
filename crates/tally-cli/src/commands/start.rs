//! Start command - runs the counter service.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tally_config::TallyConfig;
use tally_server::Server;
use tracing::info;

pub fn run(project: &str, address: Option<&str>) -> Result<()> {
    let project_dir = Path::new(project);

    let mut config =
        TallyConfig::load_from_dir(project_dir).context("Failed to load configuration")?;

    // CLI flag wins over every file and environment layer.
    if let Some(address) = address {
        config.server.bind_address = parse_address(address)?.to_string();
    }

    let server = Server::new(&config).context("Failed to create server")?;

    info!("Starting tally server...");
    println!();
    println!("tally - role-gated counter service");
    println!();
    println!(
        "  Project:        {}",
        project_dir
            .canonicalize()
            .unwrap_or(project_dir.to_path_buf())
            .display()
    );
    println!("  Bind address:   {}", server.addr());
    println!("  Roles:          {}", config.roles.len());
    println!("  Users:          {}", config.users.len());
    println!();
    println!("Server is ready. Press Ctrl+C to stop.");
    println!();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(server.run())
        .context("Server error during operation")?;

    println!();
    println!("Server stopped gracefully.");

    Ok(())
}

/// Parses an address string into a `SocketAddr`.
///
/// Accepts:
/// - Port only: "8080" -> "127.0.0.1:8080"
/// - Full address: "0.0.0.0:8080"
/// - IPv6: `[::1]:8080`
fn parse_address(address: &str) -> Result<SocketAddr> {
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(port) = address.parse::<u16>() {
        return Ok(SocketAddr::from(([127, 0, 0, 1], port)));
    }

    bail!(
        "Invalid address '{address}'. Use a port (e.g., '8080') or full address (e.g., '0.0.0.0:8080')"
    );
}

//! Roles command - prints the resolved role registry.

use std::path::Path;

use anyhow::{Context, Result};
use tally_config::TallyConfig;
use tally_rbac::RoleRegistry;

use crate::style::list_table;

pub fn run(project: &str) -> Result<()> {
    let config = TallyConfig::load_from_dir(Path::new(project))
        .context("Failed to load configuration")?;
    let registry = RoleRegistry::from_mapping(config.roles.clone())
        .context("Invalid role configuration")?;

    let rows = role_rows(&registry, &config);
    if rows.is_empty() {
        println!("No roles configured.");
        return Ok(());
    }

    println!("{}", list_table(&["Role", "Permissions", "Users"], &rows));
    Ok(())
}

/// One row per role: its permissions and the ids of users holding it.
fn role_rows(registry: &RoleRegistry, config: &TallyConfig) -> Vec<Vec<String>> {
    registry
        .roles()
        .map(|(role, permissions)| {
            let permissions = permissions
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let holders = config
                .users
                .iter()
                .filter(|u| u.roles.iter().any(|r| r == role.as_str()))
                .map(|u| u.id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                role.to_string(),
                if permissions.is_empty() { "-".to_string() } else { permissions },
                if holders.is_empty() { "-".to_string() } else { holders },
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_config::UserDefinition;

    #[test]
    fn test_role_rows_list_holders() {
        let config = TallyConfig {
            users: vec![UserDefinition {
                id: "1".to_string(),
                name: None,
                token: "t".to_string(),
                roles: vec!["admin".to_string()],
            }],
            ..Default::default()
        };
        let registry = RoleRegistry::from_mapping(config.roles.clone()).unwrap();

        let rows = role_rows(&registry, &config);
        assert_eq!(
            rows,
            vec![
                vec!["admin".to_string(), "increment, read".to_string(), "1".to_string()],
                vec!["user".to_string(), "read".to_string(), "-".to_string()],
            ]
        );
    }
}

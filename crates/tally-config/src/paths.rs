//! Path utilities and XDG directory discovery

use crate::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// XDG-compliant paths for Tally
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    /// Create a new Paths instance with XDG discovery
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("com", "Tally", "tally"),
        }
    }

    /// Get user config directory (~/.config/tally/)
    pub fn user_config_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|p| p.config_dir().to_path_buf())
            .ok_or_else(|| {
                ConfigError::XdgError("Failed to determine user config directory".to_string())
            })
    }

    /// Get user config file path (~/.config/tally/config.toml)
    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_config_dir()?.join("config.toml"))
    }

    /// Get project config file path (tally.toml)
    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("tally.toml")
    }

    /// Get local config file path (tally.local.toml, gitignored)
    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("tally.local.toml")
    }

    /// Check if a project has a tally.toml
    pub fn is_initialized(project_dir: impl AsRef<Path>) -> bool {
        Self::project_config_file(project_dir).exists()
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_xdg_paths() {
        let paths = Paths::new();

        // May be unavailable on some platforms; must not panic either way
        if let Ok(config_file) = paths.user_config_file() {
            assert!(config_file.to_string_lossy().contains("tally"));
            assert!(config_file.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_project_paths() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config_file = Paths::project_config_file(project_dir);
        assert_eq!(config_file, project_dir.join("tally.toml"));

        let local_file = Paths::local_config_file(project_dir);
        assert_eq!(local_file, project_dir.join("tally.local.toml"));

        assert!(!Paths::is_initialized(project_dir));

        std::fs::write(&config_file, "[server]\nbind_address = \"127.0.0.1:8080\"\n").unwrap();
        assert!(Paths::is_initialized(project_dir));
    }
}

//! Path management for workstation configuration and state.
//!
//! ```text
//! ~/.config/workstation/          # Config directory (AppPaths default)
//! ├── config.toml                 # Application configuration
//! └── workstation-storage.json    # Persisted project state
//! ```
//!
//! The state directory can be moved with `[storage] state_dir` in the config
//! file or the `WORKSTATION_STATE_DIR` environment variable.

use std::path::PathBuf;
use version_migrate::AppPaths;

use workstation_core::config::WorkstationConfig;
use workstation_core::{Result, WorkstationError};

/// Environment override for the state directory.
pub const STATE_DIR_ENV: &str = "WORKSTATION_STATE_DIR";

const APP_NAME: &str = "workstation";
const CONFIG_FILENAME: &str = "config.toml";

pub struct WorkstationPaths;

impl WorkstationPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new(APP_NAME)
    }

    /// Returns the workstation configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        Self::app_paths()
            .config_dir()
            .map_err(|e| WorkstationError::config(format!("Cannot find config directory: {}", e)))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Returns the directory holding persisted project state.
    ///
    /// Precedence: environment variable, then config, then the config directory.
    pub fn state_dir(config: &WorkstationConfig) -> Result<PathBuf> {
        Self::state_dir_with(config, |key| std::env::var(key).ok())
    }

    fn state_dir_with<F>(config: &WorkstationConfig, lookup: F) -> Result<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(STATE_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        match config.storage.state_dir.as_deref() {
            Some(dir) => Ok(dir.to_path_buf()),
            None => Self::config_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(dir: &str) -> WorkstationConfig {
        let mut config = WorkstationConfig::default();
        config.storage.state_dir = Some(PathBuf::from(dir));
        config
    }

    #[test]
    fn test_env_wins_over_config() {
        let dir = WorkstationPaths::state_dir_with(&configured("/tmp/ws-config"), |key| {
            (key == STATE_DIR_ENV).then(|| "/tmp/ws-env".to_string())
        })
        .unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/ws-env"));
    }

    #[test]
    fn test_blank_env_falls_back_to_config() {
        let dir =
            WorkstationPaths::state_dir_with(&configured("/tmp/ws-config"), |_| Some("  ".into()))
                .unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/ws-config"));
    }

    #[test]
    fn test_configured_state_dir_wins_over_default() {
        let dir = WorkstationPaths::state_dir_with(&configured("/tmp/ws-state"), |_| None).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/ws-state"));
    }
}

//! Loads `config.toml` into [`WorkstationConfig`].
//!
//! A missing file yields defaults; a file that exists but does not parse is
//! a configuration error. Environment variables are applied last.

use std::path::Path;

use workstation_core::config::WorkstationConfig;
use workstation_core::{Result, WorkstationError};

use crate::paths::{STATE_DIR_ENV, WorkstationPaths};

/// Environment override for the execution API root.
pub const EXECUTION_URL_ENV: &str = "WORKSTATION_EXECUTION_URL";

/// Loads the config from the default location.
pub async fn load_config() -> Result<WorkstationConfig> {
    let path = WorkstationPaths::config_file()?;
    load_config_from(&path).await
}

/// Loads the config from `path`, then applies environment overrides.
pub async fn load_config_from(path: &Path) -> Result<WorkstationConfig> {
    let mut config = match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_config(&content).map_err(|e| {
            WorkstationError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "[ConfigLoader] No config at {}, using defaults",
                path.display()
            );
            WorkstationConfig::default()
        }
        Err(e) => {
            return Err(WorkstationError::io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn parse_config(content: &str) -> Result<WorkstationConfig> {
    Ok(toml::from_str(content)?)
}

/// Applies environment overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut WorkstationConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(EXECUTION_URL_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("[ConfigLoader] Execution URL overridden by {}", EXECUTION_URL_ENV);
        config.execution.base_url = url;
    }
    if let Some(dir) = lookup(STATE_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        config.storage.state_dir = Some(dir.into());
    }
}

//! Configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer; every field has a
//! default so a missing file or section is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EXECUTION_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkstationConfig {
    pub execution: ExecutionConfig,
    pub sync: SyncConfig,
    pub preview: PreviewConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Root of the execution API (routes are `/projects/...`, `/notebook/...`).
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXECUTION_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ExecutionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Live-sync of edits into a running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub debounce_ms: u64,
    pub default_entrypoint: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            default_entrypoint: crate::bundler::DEFAULT_ENTRYPOINT.to_string(),
        }
    }
}

impl PreviewConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform config directory for the persisted state.
    pub state_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: WorkstationConfig = toml::from_str(
            r#"
[execution]
base_url = "http://exec.internal:9000/api"

[sync]
debounce_ms = 150
"#,
        )
        .unwrap();

        assert_eq!(config.execution.base_url, "http://exec.internal:9000/api");
        assert_eq!(config.execution.request_timeout_secs, 30);
        assert_eq!(config.sync.debounce(), Duration::from_millis(150));
        assert_eq!(config.preview.default_entrypoint, "index.html");
        assert!(config.storage.state_dir.is_none());
    }
}

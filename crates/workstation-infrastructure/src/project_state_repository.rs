//! Project state repository implementations.
//!
//! The state is one versioned JSON blob stored under the key
//! `workstation-storage`. Loading never fails on bad content: unreadable or
//! unmigratable blobs are logged and replaced by the default state so the
//! editor still starts.
//!
//! File location: `{state_dir}/workstation-storage.json`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use version_migrate::Migrator;

use workstation_core::error::Result;
use workstation_core::project::{ProjectState, ProjectStateRepository, STORAGE_KEY};
use workstation_core::WorkstationError;

use crate::dto::{PROJECT_STATE_ENTITY, create_project_state_migrator, decode_project_state};

fn encode(migrator: &Migrator, state: &ProjectState) -> Result<String> {
    migrator
        .save_domain_flat(PROJECT_STATE_ENTITY, state.clone())
        .map_err(|e| WorkstationError::Migration(format!("Failed to serialize project state: {}", e)))
}

// ============================================================================
// File-backed repository
// ============================================================================

/// File-based project state repository with version migration support.
pub struct FileProjectStateRepository {
    path: PathBuf,
    migrator: Migrator,
}

impl FileProjectStateRepository {
    /// Creates a repository storing its blob in `state_dir`.
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(format!("{}.json", STORAGE_KEY)),
            migrator: create_project_state_migrator(),
        }
    }

    /// Returns the blob path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProjectStateRepository for FileProjectStateRepository {
    async fn load(&self) -> Result<ProjectState> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[FileProjectStateRepository] No state at {}, starting fresh",
                    self.path.display()
                );
                return Ok(ProjectState::default());
            }
            Err(e) => {
                return Err(WorkstationError::io(format!(
                    "Failed to read project state: {}",
                    e
                )));
            }
        };

        Ok(decode_project_state(&self.migrator, &content))
    }

    async fn save(&self, state: &ProjectState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| WorkstationError::io(format!("Failed to create directory: {}", e)))?;
        }

        let serialized = encode(&self.migrator, state)?;

        // Write then rename so a crash never leaves a truncated blob.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)
            .await
            .map_err(|e| WorkstationError::io(format!("Failed to write project state: {}", e)))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| WorkstationError::io(format!("Failed to replace project state: {}", e)))?;

        tracing::debug!(
            "[FileProjectStateRepository] Saved project state to {}",
            self.path.display()
        );
        Ok(())
    }
}

// ============================================================================
// In-memory repository
// ============================================================================

/// Keeps the serialized blob in memory. Used by tests and the CLI's
/// one-shot commands.
pub struct InMemoryProjectStateRepository {
    blob: Mutex<Option<String>>,
    migrator: Migrator,
}

impl InMemoryProjectStateRepository {
    pub fn new() -> Self {
        Self {
            blob: Mutex::new(None),
            migrator: create_project_state_migrator(),
        }
    }

    /// Starts with a pre-existing stored blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
            migrator: create_project_state_migrator(),
        }
    }

    /// Returns the currently stored blob.
    pub async fn blob(&self) -> Option<String> {
        self.blob.lock().await.clone()
    }
}

impl Default for InMemoryProjectStateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectStateRepository for InMemoryProjectStateRepository {
    async fn load(&self) -> Result<ProjectState> {
        let blob = self.blob.lock().await;
        Ok(match blob.as_deref() {
            Some(content) => decode_project_state(&self.migrator, content),
            None => ProjectState::default(),
        })
    }

    async fn save(&self, state: &ProjectState) -> Result<()> {
        let serialized = encode(&self.migrator, state)?;
        *self.blob.lock().await = Some(serialized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use workstation_core::file_tree::{FileNode, FileTree};
    use workstation_core::log::TerminalLine;

    fn sample_state() -> ProjectState {
        let mut state = ProjectState::with_files(FileTree::new(vec![FileNode::file(
            "index.html",
            "<h1>hi</h1>",
        )]));
        state.terminal.append(TerminalLine::info("Starting project..."));
        state
    }

    #[tokio::test]
    async fn test_load_default_when_not_exists() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileProjectStateRepository::new(temp_dir.path());

        let state = repo.load().await.unwrap();
        assert_eq!(state, ProjectState::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileProjectStateRepository::new(temp_dir.path().join("nested"));

        let state = sample_state();
        repo.save(&state).await.unwrap();
        assert!(repo.path().ends_with("workstation-storage.json"));

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_default() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileProjectStateRepository::new(temp_dir.path());
        tokio::fs::write(repo.path(), "{ truncated").await.unwrap();

        let state = repo.load().await.unwrap();
        assert_eq!(state, ProjectState::default());
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let repo = InMemoryProjectStateRepository::new();
        assert_eq!(repo.load().await.unwrap(), ProjectState::default());

        let state = sample_state();
        repo.save(&state).await.unwrap();
        assert!(repo.blob().await.unwrap().contains("\"version\":\"1.2.0\""));
        assert_eq!(repo.load().await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_in_memory_migrates_old_blob() {
        let repo = InMemoryProjectStateRepository::with_blob(
            r#"{"version":"1.1.0","files":[],"terminal":[{"kind":"error","text":"boom"}]}"#,
        );
        let state = repo.load().await.unwrap();
        assert_eq!(state.terminal.last().unwrap().text, "boom");
        assert!(state.opened_files.is_empty());
    }
}

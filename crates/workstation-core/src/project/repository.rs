//! Project state repository trait.

use async_trait::async_trait;

use super::model::ProjectState;
use crate::error::Result;

/// Fixed key the project state is stored under.
pub const STORAGE_KEY: &str = "workstation-storage";

/// Durable storage for the persisted part of [`ProjectState`].
#[async_trait]
pub trait ProjectStateRepository: Send + Sync {
    /// Loads the stored state, migrating older schemas.
    ///
    /// Missing or unreadable content yields the default state; only
    /// storage-level failures are errors.
    async fn load(&self) -> Result<ProjectState>;

    /// Replaces the stored state.
    async fn save(&self, state: &ProjectState) -> Result<()>;
}

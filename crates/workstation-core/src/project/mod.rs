//! Project aggregate, persisted state repository and project type detection.

mod model;
mod project_type;
mod repository;

pub use model::{AiModelConfig, DEFAULT_AI_MODEL_ID, ProjectState};
pub use project_type::{ProjectType, detect_project_type};
pub use repository::{ProjectStateRepository, STORAGE_KEY};

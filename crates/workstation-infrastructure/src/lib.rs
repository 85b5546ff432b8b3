//! Storage, configuration and filesystem adapters for the workstation.

pub mod config_loader;
pub mod dto;
pub mod local_project;
pub mod paths;
pub mod project_state_repository;

pub use crate::config_loader::{load_config, load_config_from};
pub use crate::local_project::load_project_dir;
pub use crate::paths::WorkstationPaths;
pub use crate::project_state_repository::{
    FileProjectStateRepository, InMemoryProjectStateRepository,
};

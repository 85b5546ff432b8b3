//! Versioned DTOs for persisted state.

pub mod project_state;

pub use project_state::{
    PROJECT_STATE_ENTITY, ProjectStateDTO, ProjectStateV1_0, ProjectStateV1_1, ProjectStateV1_2,
    create_project_state_migrator, decode_project_state,
};

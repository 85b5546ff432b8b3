//! Orchestration layer: the observable project store, transient layout
//! state, the single-session run controller, debounced live-sync and the
//! live preview.

pub mod file_sync;
pub mod layout;
pub mod preview;
pub mod project_store;
pub mod run_controller;

pub use file_sync::FileSyncDebouncer;
pub use layout::{Layout, LayoutState};
pub use preview::PreviewBuilder;
pub use project_store::ProjectStore;
pub use run_controller::RunController;

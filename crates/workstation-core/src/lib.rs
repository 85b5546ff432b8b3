//! Domain layer of the Workstation: the virtual project tree, editor and log
//! state, project classification, static bundling, and the traits the outer
//! layers implement (persistence, execution backend).

pub mod bundler;
pub mod config;
pub mod editor;
pub mod error;
pub mod execution;
pub mod file_tree;
pub mod log;
pub mod notebook;
pub mod project;

// Re-export common error type
pub use error::{Result, WorkstationError};

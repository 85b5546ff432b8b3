//! Editor-side state shared with persistence.

mod opened_files;

pub use opened_files::{EditorPanel, OpenedFile, OpenedFiles};

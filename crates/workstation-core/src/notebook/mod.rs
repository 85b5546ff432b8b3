//! Notebook documents (`.ipynb`).

mod document;

pub use document::{CellType, NotebookCell, NotebookDocument};

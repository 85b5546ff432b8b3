//! Virtual project file tree.
//!
//! - `path`: slash-delimited path codec
//! - `node`: the `FileNode` model (file or folder)
//! - `tree`: the persistent `FileTree` with copy-on-write operations

pub mod path;
mod node;
mod tree;

pub use node::FileNode;
pub use tree::{FileTree, TreeEntry};

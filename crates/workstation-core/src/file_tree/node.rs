//! File tree node model.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A file or folder in the virtual project tree.
///
/// A node is a folder if and only if `children` is `Some` (possibly empty).
/// Children are shared behind `Arc` so a tree edit only rebuilds the nodes
/// on the path from the root to the target; every untouched subtree is
/// reused by the new tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    /// A single path segment (not a full path).
    pub name: String,
    /// File content. Always `None` for folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Unset means editable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_editable: Option<bool>,
    /// Present (even empty) for folders, absent for files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Arc<FileNode>>>,
}

impl FileNode {
    /// Creates a file node.
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Some(content.into()),
            is_editable: None,
            children: None,
        }
    }

    /// Creates a folder node.
    pub fn folder(name: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            name: name.into(),
            content: None,
            is_editable: None,
            children: Some(children.into_iter().map(Arc::new).collect()),
        }
    }

    /// Marks the node read-only.
    pub fn read_only(mut self) -> Self {
        self.is_editable = Some(false);
        self
    }

    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    pub fn is_file(&self) -> bool {
        self.children.is_none()
    }

    /// Returns whether edits are accepted for this node.
    pub fn is_editable(&self) -> bool {
        self.is_editable.unwrap_or(true)
    }

    /// Returns the file content, or an empty string for content-less nodes.
    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Returns the children slice (empty for files).
    pub fn children(&self) -> &[Arc<FileNode>] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Returns the extension of the node name, lowercased.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

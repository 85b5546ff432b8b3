//! Imports a directory on disk as a project tree.

use std::path::{Path, PathBuf};

use workstation_core::file_tree::{FileNode, FileTree};
use workstation_core::{Result, WorkstationError};

/// Directories never imported.
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "target",
    "__pycache__",
    ".venv",
];

/// Reads `root` recursively into a [`FileTree`].
///
/// Entries are sorted by name, ignored directories are skipped, and files
/// that are not valid UTF-8 are left out.
pub async fn load_project_dir(root: impl AsRef<Path>) -> Result<FileTree> {
    let root = root.as_ref();
    let is_dir = tokio::fs::metadata(root)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(WorkstationError::io(format!(
            "Not a directory: {}",
            root.display()
        )));
    }
    Ok(FileTree::new(read_children(root.to_path_buf()).await?))
}

async fn read_children(dir: PathBuf) -> Result<Vec<FileNode>> {
    let mut read_dir = tokio::fs::read_dir(&dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        entries.push(entry);
    }
    entries.sort_by_key(|entry| entry.file_name());

    let mut nodes = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::debug!("[LocalProject] Skipping non UTF-8 name {:?}", entry.file_name());
            continue;
        };
        let file_type = entry.file_type().await?;

        if file_type.is_dir() {
            if IGNORED_DIRS.contains(&name.as_str()) {
                continue;
            }
            let children = Box::pin(read_children(entry.path())).await?;
            nodes.push(FileNode::folder(name, children));
        } else if file_type.is_file() {
            match tokio::fs::read_to_string(entry.path()).await {
                Ok(content) => nodes.push(FileNode::file(name, content)),
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::debug!("[LocalProject] Skipping binary file {}", name);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(nodes)
}

//! Persistent file tree and its path-addressed operations.
//!
//! Every operation takes `&self` and returns a new [`FileTree`]. Only the
//! nodes on the path from the root to the target are rebuilt; all other
//! subtrees are shared with the input tree through `Arc`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::node::FileNode;
use super::path;
use crate::error::{Result, WorkstationError};

/// The whole project tree: an ordered list of root-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    roots: Vec<Arc<FileNode>>,
}

/// A node visited during a tree walk, with its full path.
#[derive(Debug, Clone)]
pub struct TreeEntry<'a> {
    pub path: String,
    pub node: &'a FileNode,
}

impl FileTree {
    pub fn new(roots: Vec<FileNode>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn roots(&self) -> &[Arc<FileNode>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// True when both trees share every root node (no edit happened between them).
    pub fn same_as(&self, other: &FileTree) -> bool {
        self.roots.len() == other.roots.len()
            && self
                .roots
                .iter()
                .zip(other.roots.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }

    // ============================================================================
    // Lookup
    // ============================================================================

    /// Resolves a path to its node. The first sibling with a matching name wins.
    pub fn resolve(&self, path: &str) -> Option<&FileNode> {
        let mut siblings = self.roots.as_slice();
        let mut found: Option<&FileNode> = None;
        for segment in path::decode(path) {
            let node = siblings.iter().find(|n| n.name == segment)?;
            siblings = node.children();
            found = Some(node.as_ref());
        }
        found
    }

    /// Returns the content of the file at `path`.
    pub fn content_at(&self, path: &str) -> Option<&str> {
        self.resolve(path)
            .filter(|n| n.is_file())
            .and_then(|n| n.content.as_deref())
    }

    /// Walks the tree in pre-order, yielding folders and files alike.
    pub fn walk(&self) -> Vec<TreeEntry<'_>> {
        fn visit<'a>(nodes: &'a [Arc<FileNode>], parent: &str, out: &mut Vec<TreeEntry<'a>>) {
            for node in nodes {
                let path = path::child_path(parent, &node.name);
                out.push(TreeEntry {
                    path: path.clone(),
                    node: node.as_ref(),
                });
                if node.is_folder() {
                    visit(node.children(), &path, out);
                }
            }
        }

        let mut out = Vec::new();
        visit(&self.roots, "", &mut out);
        out
    }

    /// Files only, in pre-order.
    pub fn files(&self) -> Vec<TreeEntry<'_>> {
        self.walk().into_iter().filter(|e| e.node.is_file()).collect()
    }

    /// First node (folder or file) named `name`, in pre-order.
    pub fn find_by_name(&self, name: &str) -> Option<TreeEntry<'_>> {
        self.walk().into_iter().find(|e| e.node.name == name)
    }

    // ============================================================================
    // Mutations (copy-on-write)
    // ============================================================================

    /// Replaces the content of the file at `path`.
    pub fn update_content(&self, path: &str, content: impl Into<String>) -> Result<FileTree> {
        let segments = path::decode(path);
        let (name, parents) = segments
            .split_last()
            .ok_or_else(|| WorkstationError::InvalidPath("cannot update the root".into()))?;
        let content = content.into();

        let roots = rebuild(&self.roots, parents, path, |siblings| {
            let index = position(siblings, name).ok_or_else(|| WorkstationError::path_not_found(path))?;
            let node = &siblings[index];
            if node.is_folder() {
                return Err(WorkstationError::NotAFile { path: path.to_string() });
            }
            if !node.is_editable() {
                return Err(WorkstationError::ReadOnly { path: path.to_string() });
            }

            let mut updated = FileNode::clone(node);
            updated.content = Some(content);
            let mut next = siblings.to_vec();
            next[index] = Arc::new(updated);
            Ok(next)
        })?;

        Ok(FileTree { roots })
    }

    /// Appends `node` to the folder at `parent_path` (root when empty).
    ///
    /// The whole inserted subtree is validated: every name must be a single
    /// segment, siblings must be unique and folders must not carry content.
    pub fn create(&self, parent_path: &str, node: FileNode) -> Result<FileTree> {
        validate_node(&node, &path::child_path(parent_path, &node.name))?;
        let parents = path::decode(parent_path);
        if !parents.is_empty() {
            match self.resolve(parent_path) {
                None => return Err(WorkstationError::path_not_found(parent_path)),
                Some(parent) if !parent.is_folder() => {
                    return Err(WorkstationError::ParentNotFolder {
                        path: parent_path.to_string(),
                    });
                }
                Some(_) => {}
            }
        }

        let roots = rebuild(&self.roots, &parents, parent_path, |siblings| {
            if position(siblings, &node.name).is_some() {
                return Err(WorkstationError::DuplicateName {
                    parent: path::encode(&parents),
                    name: node.name.clone(),
                });
            }
            let mut next = siblings.to_vec();
            next.push(Arc::new(node));
            Ok(next)
        })?;

        Ok(FileTree { roots })
    }

    /// Renames the node at `path` in place. Its position and subtree are kept.
    pub fn rename(&self, path: &str, new_name: &str) -> Result<FileTree> {
        validate_name(new_name)?;
        let segments = path::decode(path);
        let (name, parents) = segments
            .split_last()
            .ok_or_else(|| WorkstationError::InvalidPath("cannot rename the root".into()))?;

        let roots = rebuild(&self.roots, parents, path, |siblings| {
            let index = position(siblings, name).ok_or_else(|| WorkstationError::path_not_found(path))?;
            let clash = siblings
                .iter()
                .enumerate()
                .any(|(i, n)| i != index && n.name == new_name);
            if clash {
                return Err(WorkstationError::DuplicateName {
                    parent: path::encode(parents),
                    name: new_name.to_string(),
                });
            }

            let mut renamed = FileNode::clone(&siblings[index]);
            renamed.name = new_name.to_string();
            let mut next = siblings.to_vec();
            next[index] = Arc::new(renamed);
            Ok(next)
        })?;

        Ok(FileTree { roots })
    }

    /// Removes the node at `path`, together with its whole subtree.
    pub fn delete(&self, path: &str) -> Result<FileTree> {
        let segments = path::decode(path);
        let (name, parents) = segments
            .split_last()
            .ok_or_else(|| WorkstationError::InvalidPath("cannot delete the root".into()))?;

        let roots = rebuild(&self.roots, parents, path, |siblings| {
            let index = position(siblings, name).ok_or_else(|| WorkstationError::path_not_found(path))?;
            let mut next = siblings.to_vec();
            next.remove(index);
            Ok(next)
        })?;

        Ok(FileTree { roots })
    }
}

impl From<Vec<FileNode>> for FileTree {
    fn from(nodes: Vec<FileNode>) -> Self {
        Self::new(nodes)
    }
}

fn position(siblings: &[Arc<FileNode>], name: &str) -> Option<usize> {
    siblings.iter().position(|n| n.name == name)
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(path::SEPARATOR) {
        return Err(WorkstationError::InvalidPath(format!(
            "'{}' is not a valid node name",
            name
        )));
    }
    Ok(())
}

fn validate_node(node: &FileNode, node_path: &str) -> Result<()> {
    validate_name(&node.name)?;
    if node.is_folder() && node.content.is_some() {
        return Err(WorkstationError::InvalidPath(format!(
            "folder '{}' cannot carry content",
            node_path
        )));
    }

    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        if children[..i].iter().any(|prev| prev.name == child.name) {
            return Err(WorkstationError::DuplicateName {
                parent: node_path.to_string(),
                name: child.name.clone(),
            });
        }
        validate_node(child, &path::child_path(node_path, &child.name))?;
    }
    Ok(())
}

/// Rebuilds the sibling list reached by following `parents`, applying `edit`
/// to the innermost list. Nodes off the path are shared, not copied.
fn rebuild<F>(
    siblings: &[Arc<FileNode>],
    parents: &[&str],
    full_path: &str,
    edit: F,
) -> Result<Vec<Arc<FileNode>>>
where
    F: FnOnce(&[Arc<FileNode>]) -> Result<Vec<Arc<FileNode>>>,
{
    let Some((head, rest)) = parents.split_first() else {
        return edit(siblings);
    };

    let index = position(siblings, head).ok_or_else(|| WorkstationError::path_not_found(full_path))?;
    let folder = &siblings[index];
    if !folder.is_folder() {
        return Err(WorkstationError::path_not_found(full_path));
    }

    let children = rebuild(folder.children(), rest, full_path, edit)?;
    let mut updated = FileNode::clone(folder);
    updated.children = Some(children);

    let mut next = siblings.to_vec();
    next[index] = Arc::new(updated);
    Ok(next)
}

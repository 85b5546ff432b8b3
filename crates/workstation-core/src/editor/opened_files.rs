//! Opened-file registry.
//!
//! Tracks which files are open as editor tabs across the two editor panels.
//! Entries are keyed by path: a path is open at most once, whichever panel
//! shows it.

use serde::{Deserialize, Serialize};

use crate::file_tree::{FileNode, path};

/// The editor panel a tab belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorPanel {
    #[default]
    Primary,
    Secondary,
}

/// An open tab: the file's path and a snapshot of its node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedFile {
    pub path: String,
    pub file: FileNode,
    #[serde(default)]
    pub panel: EditorPanel,
}

impl OpenedFile {
    pub fn new(path: impl Into<String>, file: FileNode) -> Self {
        Self {
            path: path.into(),
            file,
            panel: EditorPanel::Primary,
        }
    }

    pub fn in_panel(mut self, panel: EditorPanel) -> Self {
        self.panel = panel;
        self
    }
}

/// Ordered, path-deduplicated set of open tabs.
///
/// New entries are appended; existing entries keep their relative order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpenedFiles {
    entries: Vec<OpenedFile>,
}

impl OpenedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `file` unless its path is already open. Returns whether it was added.
    pub fn add(&mut self, file: OpenedFile) -> bool {
        if self.contains(&file.path) {
            return false;
        }
        self.entries.push(file);
        true
    }

    /// Removes the tab for `path`. Returns whether a tab was removed.
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|f| f.path != path);
        self.entries.len() != before
    }

    /// Replaces every tab, dropping later duplicates of a path.
    pub fn set_all(&mut self, files: Vec<OpenedFile>) {
        self.entries.clear();
        for file in files {
            self.add(file);
        }
    }

    pub fn get(&self, path: &str) -> Option<&OpenedFile> {
        self.entries.iter().find(|f| f.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpenedFile> {
        self.entries.iter()
    }

    /// Tabs shown in `panel`, in tab order.
    pub fn in_panel(&self, panel: EditorPanel) -> impl Iterator<Item = &OpenedFile> {
        self.entries.iter().filter(move |f| f.panel == panel)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the node snapshot of the tab at `path`.
    pub fn refresh(&mut self, path: &str, file: &FileNode) {
        if let Some(entry) = self.entries.iter_mut().find(|f| f.path == path) {
            entry.file = file.clone();
        }
    }

    /// Rewrites the paths of tabs at or under `from` after a rename to `to`.
    pub fn rebase(&mut self, from: &str, to: &str) {
        let new_name = path::file_name(to).map(str::to_string);
        for entry in &mut self.entries {
            if let Some(rebased) = path::rebase(&entry.path, from, to) {
                if entry.path == from {
                    if let Some(name) = &new_name {
                        entry.file.name = name.clone();
                    }
                }
                entry.path = rebased;
            }
        }
    }

    /// Closes every tab at or under `path`. Returns the number closed.
    pub fn remove_within(&mut self, path: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|f| !path::is_within(&f.path, path));
        before - self.entries.len()
    }
}

impl From<Vec<OpenedFile>> for OpenedFiles {
    fn from(files: Vec<OpenedFile>) -> Self {
        let mut opened = Self::new();
        opened.set_all(files);
        opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(path: &str) -> OpenedFile {
        let name = path::file_name(path).unwrap_or(path);
        OpenedFile::new(path, FileNode::file(name, ""))
    }

    #[test]
    fn test_add_is_idempotent_by_path() {
        let mut opened = OpenedFiles::new();
        assert!(opened.add(tab("src/app.js")));
        assert!(!opened.add(tab("src/app.js").in_panel(EditorPanel::Secondary)));
        assert_eq!(opened.len(), 1);
        assert_eq!(opened.get("src/app.js").unwrap().panel, EditorPanel::Primary);
    }

    #[test]
    fn test_remove() {
        let mut opened = OpenedFiles::from(vec![tab("a.js"), tab("b.js")]);
        assert!(opened.remove("a.js"));
        assert!(!opened.remove("a.js"));
        let paths: Vec<_> = opened.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["b.js"]);
    }

    #[test]
    fn test_set_all_replaces_and_dedupes() {
        let mut opened = OpenedFiles::from(vec![tab("old.js")]);
        opened.set_all(vec![tab("a.js"), tab("b.js"), tab("a.js")]);
        let paths: Vec<_> = opened.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_rebase_after_folder_rename() {
        let mut opened = OpenedFiles::from(vec![tab("src/app.js"), tab("srcs/x.js"), tab("src")]);
        opened.rebase("src", "app");
        let paths: Vec<_> = opened.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["app/app.js", "srcs/x.js", "app"]);
        assert_eq!(opened.get("app").unwrap().file.name, "app");
        assert_eq!(opened.get("app/app.js").unwrap().file.name, "app.js");
    }

    #[test]
    fn test_remove_within() {
        let mut opened = OpenedFiles::from(vec![tab("src/a.js"), tab("src/lib/b.js"), tab("c.js")]);
        assert_eq!(opened.remove_within("src"), 2);
        assert!(opened.contains("c.js"));
    }

    #[test]
    fn test_panels() {
        let opened = OpenedFiles::from(vec![
            tab("a.js"),
            tab("b.js").in_panel(EditorPanel::Secondary),
        ]);
        assert_eq!(opened.in_panel(EditorPanel::Secondary).count(), 1);
    }
}

//! Observable, persisted project store.
//!
//! `ProjectStore` is the single source of truth for the project. Readers take
//! cheap `Arc` snapshots or subscribe to a watch channel; writers go through
//! named operations. Each operation:
//!
//! 1. computes a new state from the latest snapshot (tree edits are
//!    copy-on-write, so the previous snapshot is never touched),
//! 2. publishes it to subscribers,
//! 3. persists it through the repository.
//!
//! Writers are serialized by an async mutex, so an operation always builds
//! on the state left by the previous one.

use std::sync::Arc;
use tokio::sync::{Mutex, watch};

use workstation_core::editor::{EditorPanel, OpenedFile};
use workstation_core::error::{Result, WorkstationError};
use workstation_core::file_tree::{FileNode, FileTree, path};
use workstation_core::log::{ChatMessage, TerminalLine};
use workstation_core::project::{AiModelConfig, ProjectState, ProjectStateRepository};

pub struct ProjectStore {
    state: watch::Sender<Arc<ProjectState>>,
    write_lock: Mutex<()>,
    repository: Arc<dyn ProjectStateRepository>,
}

/// Canonical form used for opened-file keys.
fn canonical(p: &str) -> String {
    path::encode(&path::decode(p))
}

impl ProjectStore {
    /// Creates a store seeded with `initial`. Nothing is persisted until the
    /// first mutation.
    pub fn new(repository: Arc<dyn ProjectStateRepository>, initial: ProjectState) -> Self {
        let (state, _) = watch::channel(Arc::new(initial));
        Self {
            state,
            write_lock: Mutex::new(()),
            repository,
        }
    }

    /// Creates a store from the repository's persisted state.
    pub async fn load(repository: Arc<dyn ProjectStateRepository>) -> Result<Self> {
        let initial = repository.load().await?;
        tracing::info!(
            "[ProjectStore] Loaded state: {} files, {} terminal lines, {} open tabs",
            initial.files.files().len(),
            initial.terminal.len(),
            initial.opened_files.len()
        );
        Ok(Self::new(repository, initial))
    }

    /// Latest state.
    pub fn snapshot(&self) -> Arc<ProjectState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ProjectState>> {
        self.state.subscribe()
    }

    /// Content of the file at `path` in the latest state.
    pub fn file_content(&self, path: &str) -> Option<String> {
        self.snapshot().files.content_at(path).map(str::to_string)
    }

    /// Runs `edit` against a copy of the latest state, then publishes and
    /// persists the result. A failing edit leaves the store untouched.
    async fn mutate<T, F>(&self, operation: &str, edit: F) -> Result<T>
    where
        F: FnOnce(&mut ProjectState) -> Result<T>,
    {
        let _guard = self.write_lock.lock().await;

        let mut next = ProjectState::clone(&self.snapshot());
        let output = edit(&mut next).inspect_err(|e| {
            tracing::debug!("[ProjectStore] {} rejected: {}", operation, e);
        })?;

        let next = Arc::new(next);
        self.state.send_replace(next.clone());

        if let Err(e) = self.repository.save(&next).await {
            tracing::warn!("[ProjectStore] Failed to persist after {}: {}", operation, e);
            return Err(e);
        }
        Ok(output)
    }

    // ============================================================================
    // File tree
    // ============================================================================

    /// Replaces the content of the file at `path` and refreshes its open tab.
    pub async fn update_content(&self, path: &str, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        self.mutate("update_content", |state| {
            state.files = state.files.update_content(path, content)?;
            let key = canonical(path);
            if let Some(node) = state.files.resolve(&key).cloned() {
                state.opened_files.refresh(&key, &node);
            }
            Ok(())
        })
        .await
    }

    /// Adds `node` under `parent_path` and returns the new node's path.
    pub async fn create(&self, parent_path: &str, node: FileNode) -> Result<String> {
        self.mutate("create", |state| {
            let created = path::child_path(parent_path, &node.name);
            state.files = state.files.create(parent_path, node)?;
            Ok(created)
        })
        .await
    }

    /// Renames the node at `path`; open tabs at or under it follow the rename.
    /// Returns the new path.
    pub async fn rename(&self, path: &str, new_name: &str) -> Result<String> {
        self.mutate("rename", |state| {
            state.files = state.files.rename(path, new_name)?;
            let from = canonical(path);
            let to = path::child_path(&path::parent_path(&from), new_name);
            state.opened_files.rebase(&from, &to);
            Ok(to)
        })
        .await
    }

    /// Deletes the node at `path` and closes tabs at or under it.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.mutate("delete", |state| {
            state.files = state.files.delete(path)?;
            let closed = state.opened_files.remove_within(&canonical(path));
            if closed > 0 {
                tracing::debug!("[ProjectStore] Closed {} tab(s) under {}", closed, path);
            }
            Ok(())
        })
        .await
    }

    /// Loads a different project. Tabs of the previous project are closed.
    pub async fn replace_files(&self, files: FileTree) -> Result<()> {
        self.mutate("replace_files", |state| {
            state.files = files;
            state.opened_files.set_all(Vec::new());
            Ok(())
        })
        .await
    }

    // ============================================================================
    // Opened files
    // ============================================================================

    /// Opens the file at `path` in `panel`. Returns false when it was already open.
    pub async fn open_file(&self, path: &str, panel: EditorPanel) -> Result<bool> {
        self.mutate("open_file", |state| {
            let key = canonical(path);
            let node = state
                .files
                .resolve(&key)
                .ok_or_else(|| WorkstationError::path_not_found(path))?;
            if node.is_folder() {
                return Err(WorkstationError::NotAFile { path: key });
            }
            let file = OpenedFile::new(key, node.clone()).in_panel(panel);
            Ok(state.opened_files.add(file))
        })
        .await
    }

    /// Closes the tab for `path`. Returns whether one was open.
    pub async fn close_file(&self, path: &str) -> Result<bool> {
        self.mutate("close_file", |state| {
            Ok(state.opened_files.remove(&canonical(path)))
        })
        .await
    }

    pub async fn set_opened_files(&self, files: Vec<OpenedFile>) -> Result<()> {
        self.mutate("set_opened_files", |state| {
            state.opened_files.set_all(files);
            Ok(())
        })
        .await
    }

    // ============================================================================
    // Terminal and chat logs
    // ============================================================================

    /// Appends raw process output, one terminal line per text line.
    pub async fn append_terminal_output(&self, text: &str) -> Result<()> {
        let lines = TerminalLine::split_output(text);
        if lines.is_empty() {
            return Ok(());
        }
        self.mutate("append_terminal_output", |state| {
            state.terminal.extend(lines);
            Ok(())
        })
        .await
    }

    pub async fn append_terminal_line(&self, line: TerminalLine) -> Result<()> {
        self.mutate("append_terminal_line", |state| {
            state.terminal.append(line);
            Ok(())
        })
        .await
    }

    /// Appends a batch of lines as one mutation, published and saved once.
    pub async fn append_terminal_lines(&self, lines: Vec<TerminalLine>) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        self.mutate("append_terminal_lines", |state| {
            state.terminal.extend(lines);
            Ok(())
        })
        .await
    }

    pub async fn clear_terminal(&self) -> Result<()> {
        self.mutate("clear_terminal", |state| {
            state.terminal.clear();
            Ok(())
        })
        .await
    }

    pub async fn append_chat_message(&self, message: ChatMessage) -> Result<()> {
        self.mutate("append_chat_message", |state| {
            state.chat.push(message.content.clone());
            state.chat_messages.append(message);
            Ok(())
        })
        .await
    }

    pub async fn clear_chat(&self) -> Result<()> {
        self.mutate("clear_chat", |state| {
            state.chat.clear();
            state.chat_messages.clear();
            Ok(())
        })
        .await
    }

    pub async fn set_ai_model(&self, model_id: impl Into<String>, config: AiModelConfig) -> Result<()> {
        let model_id = model_id.into();
        self.mutate("set_ai_model", |state| {
            state.ai_model_id = model_id;
            state.ai_model_config = config;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use workstation_core::log::{LineKind, MessageRole};
    use workstation_infrastructure::InMemoryProjectStateRepository;

    fn sample_tree() -> FileTree {
        FileTree::new(vec![
            FileNode::file("index.html", "<h1>hi</h1>"),
            FileNode::folder(
                "src",
                vec![
                    FileNode::file("app.js", "run()"),
                    FileNode::folder("lib", vec![FileNode::file("util.js", "1")]),
                ],
            ),
        ])
    }

    fn store_with(tree: FileTree) -> (Arc<InMemoryProjectStateRepository>, ProjectStore) {
        let repo = Arc::new(InMemoryProjectStateRepository::new());
        let store = ProjectStore::new(repo.clone(), ProjectState::with_files(tree));
        (repo, store)
    }

    #[tokio::test]
    async fn test_update_publishes_new_snapshot_and_keeps_old() {
        let (_, store) = store_with(sample_tree());
        let before = store.snapshot();
        let mut rx = store.subscribe();

        store.update_content("src/app.js", "run(2)").await.unwrap();

        assert!(rx.has_changed().unwrap());
        let after = rx.borrow_and_update().clone();
        assert_eq!(after.files.content_at("src/app.js"), Some("run(2)"));
        assert_eq!(before.files.content_at("src/app.js"), Some("run()"));
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_mutation_is_persisted() {
        let (repo, store) = store_with(sample_tree());
        store.create("src", FileNode::file("new.js", "")).await.unwrap();

        let persisted = repo.load().await.unwrap();
        assert!(persisted.files.resolve("src/new.js").is_some());
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_state_untouched() {
        let (repo, store) = store_with(sample_tree());
        let before = store.snapshot();

        let err = store.update_content("src/missing.js", "x").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert!(repo.blob().await.is_none());
    }

    #[tokio::test]
    async fn test_update_refreshes_open_tab() {
        let (_, store) = store_with(sample_tree());
        store.open_file("/src/app.js", EditorPanel::Primary).await.unwrap();
        store.update_content("src/app.js", "changed").await.unwrap();

        let state = store.snapshot();
        let tab = state.opened_files.get("src/app.js").unwrap();
        assert_eq!(tab.file.content.as_deref(), Some("changed"));
    }

    #[tokio::test]
    async fn test_rename_rebases_open_tabs() {
        let (_, store) = store_with(sample_tree());
        store.open_file("src/lib/util.js", EditorPanel::Secondary).await.unwrap();
        store.open_file("index.html", EditorPanel::Primary).await.unwrap();

        let new_path = store.rename("src", "source").await.unwrap();
        assert_eq!(new_path, "source");

        let state = store.snapshot();
        assert!(state.opened_files.contains("source/lib/util.js"));
        assert!(state.opened_files.contains("index.html"));
        assert_eq!(state.files.content_at("source/lib/util.js"), Some("1"));
    }

    #[tokio::test]
    async fn test_delete_closes_nested_tabs() {
        let (_, store) = store_with(sample_tree());
        store.open_file("src/app.js", EditorPanel::Primary).await.unwrap();
        store.open_file("src/lib/util.js", EditorPanel::Primary).await.unwrap();
        store.open_file("index.html", EditorPanel::Primary).await.unwrap();

        store.delete("src").await.unwrap();

        let state = store.snapshot();
        let open: Vec<_> = state.opened_files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(open, vec!["index.html"]);
        assert!(state.files.resolve("src").is_none());
    }

    #[tokio::test]
    async fn test_open_file_rejects_folders_and_is_idempotent() {
        let (_, store) = store_with(sample_tree());
        assert!(matches!(
            store.open_file("src", EditorPanel::Primary).await,
            Err(WorkstationError::NotAFile { .. })
        ));
        assert!(store.open_file("index.html", EditorPanel::Primary).await.unwrap());
        assert!(!store.open_file("index.html", EditorPanel::Secondary).await.unwrap());
        assert_eq!(store.snapshot().opened_files.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_files_resets_tabs() {
        let (_, store) = store_with(sample_tree());
        store.open_file("index.html", EditorPanel::Primary).await.unwrap();

        store
            .replace_files(FileTree::new(vec![FileNode::file("main.py", "")]))
            .await
            .unwrap();

        let state = store.snapshot();
        assert!(state.opened_files.is_empty());
        assert!(state.files.resolve("main.py").is_some());
    }

    #[tokio::test]
    async fn test_terminal_and_chat_logs() {
        let (repo, store) = store_with(FileTree::default());
        store.append_terminal_output("one\r\ntwo\n").await.unwrap();
        store.append_terminal_line(TerminalLine::error("boom")).await.unwrap();
        store
            .append_chat_message(ChatMessage::new(MessageRole::User, "hello"))
            .await
            .unwrap();

        let state = store.snapshot();
        let texts: Vec<_> = state.terminal.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "boom"]);
        assert_eq!(state.terminal.last().unwrap().kind, LineKind::Error);
        assert_eq!(state.chat, vec!["hello".to_string()]);

        store.clear_terminal().await.unwrap();
        store.clear_chat().await.unwrap();
        let persisted = repo.load().await.unwrap();
        assert!(persisted.terminal.is_empty());
        assert!(persisted.chat_messages.is_empty());
    }

    struct FailingRepository;

    #[async_trait]
    impl ProjectStateRepository for FailingRepository {
        async fn load(&self) -> Result<ProjectState> {
            Ok(ProjectState::default())
        }

        async fn save(&self, _state: &ProjectState) -> Result<()> {
            Err(WorkstationError::io("disk full"))
        }
    }

    #[tokio::test]
    async fn test_persist_failure_is_reported_after_publish() {
        let store = ProjectStore::load(Arc::new(FailingRepository)).await.unwrap();
        let err = store
            .set_ai_model("gpt-4o", AiModelConfig::default())
            .await
            .unwrap_err();

        assert!(err.is_io());
        assert_eq!(store.snapshot().ai_model_id, "gpt-4o");
    }
}

//! Stored blobs from every schema version load through the file repository.

use tempfile::TempDir;
use workstation_core::log::LineKind;
use workstation_core::project::{DEFAULT_AI_MODEL_ID, ProjectStateRepository};
use workstation_infrastructure::FileProjectStateRepository;

async fn repo_with_blob(blob: &str) -> (TempDir, FileProjectStateRepository) {
    let temp_dir = TempDir::new().unwrap();
    let repo = FileProjectStateRepository::new(temp_dir.path());
    tokio::fs::write(repo.path(), blob).await.unwrap();
    (temp_dir, repo)
}

#[tokio::test]
async fn legacy_blob_without_version_is_upgraded_and_rewritten() {
    let (_dir, repo) = repo_with_blob(
        r#"{"files":[{"name":"app.py","content":"print('hi')"}],"chat":[],"terminal":["hi"]}"#,
    )
    .await;

    let state = repo.load().await.unwrap();
    assert_eq!(state.files.content_at("app.py"), Some("print('hi')"));
    assert_eq!(state.terminal.last().unwrap().kind, LineKind::Output);
    assert_eq!(state.ai_model_id, DEFAULT_AI_MODEL_ID);

    repo.save(&state).await.unwrap();
    let rewritten = tokio::fs::read_to_string(repo.path()).await.unwrap();
    assert!(rewritten.contains("\"version\":\"1.2.0\""));
    assert_eq!(repo.load().await.unwrap(), state);
}

#[tokio::test]
async fn current_blob_without_opened_files_loads_with_no_tabs() {
    let (_dir, repo) = repo_with_blob(
        r#"{"version":"1.2.0","files":[{"name":"src","children":[]}],"chatMessages":[{"role":"user","content":"hi"}]}"#,
    )
    .await;

    let state = repo.load().await.unwrap();
    assert!(state.opened_files.is_empty());
    assert_eq!(state.chat_messages.len(), 1);
    assert!(state.files.resolve("src").unwrap().is_folder());
}

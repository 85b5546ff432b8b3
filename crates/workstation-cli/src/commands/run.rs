use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use workstation_application::{Layout, ProjectStore, RunController};
use workstation_core::log::{LineKind, TerminalLine};
use workstation_core::project::{ProjectState, detect_project_type};
use workstation_core::config::WorkstationConfig;
use workstation_core::file_tree::FileTree;
use workstation_infrastructure::{
    FileProjectStateRepository, InMemoryProjectStateRepository, WorkstationPaths, load_config,
    load_project_dir,
};
use workstation_interaction::ExecutionApiClient;

fn print_line(line: &TerminalLine) {
    match line.kind {
        LineKind::Output => println!("{}", line.text),
        LineKind::Info => println!("{}", line.text.cyan()),
        LineKind::Warning => println!("{}", line.text.yellow()),
        LineKind::Error => println!("{}", line.text.red()),
    }
}

/// Builds the store for a run. With `persist`, the saved project state is
/// loaded from the state directory, its tree is replaced by the directory
/// contents and every later mutation is saved there.
async fn open_store(
    config: &WorkstationConfig,
    files: FileTree,
    persist: bool,
) -> Result<Arc<ProjectStore>> {
    if !persist {
        // one-shot runs never overwrite the persisted project
        return Ok(Arc::new(ProjectStore::new(
            Arc::new(InMemoryProjectStateRepository::new()),
            ProjectState::with_files(files),
        )));
    }

    let state_dir = WorkstationPaths::state_dir(config)?;
    let repository = FileProjectStateRepository::new(&state_dir);
    tracing::info!("[run] Persisting project state to {}", repository.path().display());
    let store = ProjectStore::load(Arc::new(repository))
        .await
        .context("Failed to load persisted project state")?;
    if store.snapshot().files != files {
        store.replace_files(files).await?;
    }
    Ok(Arc::new(store))
}

/// Runs the project in `dir` until its stream ends or Ctrl-C is pressed.
pub async fn run(dir: &Path, persist: bool) -> Result<()> {
    let config = load_config().await.context("Failed to load configuration")?;
    let files = load_project_dir(dir)
        .await
        .with_context(|| format!("Failed to load project from {}", dir.display()))?;
    tracing::info!(
        "[run] Loaded {} ({}), {} files",
        dir.display(),
        detect_project_type(&files),
        files.files().len()
    );

    let store = open_store(&config, files, persist).await?;
    let layout = Arc::new(Layout::new());
    let backend = Arc::new(ExecutionApiClient::new(&config.execution)?);
    let controller = RunController::new(backend, store.clone(), layout.clone(), config.sync.debounce());

    let mut state_rx = store.subscribe();
    let mut layout_rx = layout.subscribe();
    // history loaded from disk is not replayed
    let mut printed = store.snapshot().terminal.len();

    let session = match controller.start().await {
        Ok(session) => session,
        Err(e) => {
            for line in store.snapshot().terminal.since(printed) {
                print_line(line);
            }
            return Err(e).context("Failed to start project");
        }
    };

    loop {
        let state = state_rx.borrow_and_update().clone();
        for line in state.terminal.since(printed) {
            print_line(line);
        }
        printed = state.terminal.len();

        if !controller.is_running().await {
            break;
        }

        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = layout_rx.changed() => {
                if changed.is_ok() && layout_rx.borrow_and_update().preview_visible {
                    println!("{} {}", "Preview ready:".green().bold(), session.preview_url());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("[run] Interrupted, stopping session {}", session.session_id);
                controller.stop().await?;
            }
        }
    }

    for line in store.snapshot().terminal.since(printed) {
        print_line(line);
    }
    Ok(())
}

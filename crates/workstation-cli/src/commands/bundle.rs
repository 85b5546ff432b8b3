use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use workstation_application::{PreviewBuilder, ProjectStore};
use workstation_core::bundler;
use workstation_core::project::{ProjectState, detect_project_type};
use workstation_infrastructure::{InMemoryProjectStateRepository, load_config, load_project_dir};

/// How often `--watch` rescans the project directory.
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub async fn bundle(dir: &Path, entry: Option<&str>, output: Option<&Path>) -> Result<()> {
    let config = load_config().await.context("Failed to load configuration")?;
    let files = load_project_dir(dir)
        .await
        .with_context(|| format!("Failed to load project from {}", dir.display()))?;

    let entry = entry.unwrap_or(&config.preview.default_entrypoint);
    let html = bundler::build(&files, Some(entry));
    write_html(output, &html).await
}

/// Rebuilds the bundle into `output` whenever the project directory changes,
/// until Ctrl-C is pressed.
pub async fn watch(dir: &Path, entry: Option<&str>, output: &Path) -> Result<()> {
    let config = load_config().await.context("Failed to load configuration")?;
    let files = load_project_dir(dir)
        .await
        .with_context(|| format!("Failed to load project from {}", dir.display()))?;

    let store = Arc::new(ProjectStore::new(
        Arc::new(InMemoryProjectStateRepository::new()),
        ProjectState::with_files(files),
    ));
    let mut preview_config = config.preview.clone();
    if let Some(entry) = entry {
        preview_config.default_entrypoint = entry.to_string();
    }
    let preview = PreviewBuilder::spawn(&store, &preview_config);
    let mut html_rx = preview.subscribe();

    let initial = html_rx.borrow_and_update().clone();
    write_html(Some(output), &initial).await?;
    tracing::info!("[bundle] Watching {} (Ctrl-C to stop)", dir.display());

    let mut poll = tokio::time::interval(WATCH_POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = poll.tick() => {
                match load_project_dir(dir).await {
                    Ok(files) if files != store.snapshot().files => {
                        tracing::debug!("[bundle] Change detected in {}", dir.display());
                        store.replace_files(files).await?;
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("[bundle] Failed to rescan {}: {}", dir.display(), e),
                }
            }
            changed = html_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let html = html_rx.borrow_and_update().clone();
                write_html(Some(output), &html).await?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn write_html(output: Option<&Path>, html: &str) -> Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, html)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("[bundle] Wrote {} bytes to {}", html.len(), path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}

pub async fn detect(dir: &Path) -> Result<()> {
    let files = load_project_dir(dir)
        .await
        .with_context(|| format!("Failed to load project from {}", dir.display()))?;
    println!("{}", detect_project_type(&files));
    Ok(())
}

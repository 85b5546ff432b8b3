//! Live static preview.
//!
//! Rebuilds the simple-web bundle once the file tree has been quiet for the
//! debounce period and publishes the HTML on a watch channel. Changes that
//! leave the tree untouched (terminal output, chat) never trigger a rebuild.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use workstation_core::bundler;
use workstation_core::config::PreviewConfig;

use crate::project_store::ProjectStore;

pub struct PreviewBuilder {
    html: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl PreviewBuilder {
    /// Builds the initial bundle and starts following the store.
    pub fn spawn(store: &ProjectStore, config: &PreviewConfig) -> Self {
        let mut state_rx = store.subscribe();
        let entrypoint = config.default_entrypoint.clone();
        let quiet = config.debounce();

        let mut files = state_rx.borrow_and_update().files.clone();
        let (html_tx, html) = watch::channel(bundler::build(&files, Some(entrypoint.as_str())));

        let task = tokio::spawn(async move {
            loop {
                if state_rx.changed().await.is_err() {
                    break;
                }
                let open = wait_for_quiet(&mut state_rx, quiet).await;

                let latest = state_rx.borrow_and_update().files.clone();
                if !latest.same_as(&files) {
                    files = latest;
                    tracing::debug!("[PreviewBuilder] Rebuilding preview");
                    html_tx.send_replace(bundler::build(&files, Some(entrypoint.as_str())));
                }
                if !open {
                    break;
                }
            }
            tracing::debug!("[PreviewBuilder] Store closed, preview stopped");
        });

        Self { html, task }
    }

    /// Latest bundled HTML.
    pub fn html(&self) -> String {
        self.html.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.html.clone()
    }
}

impl Drop for PreviewBuilder {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Waits until no change arrives for `quiet`. Returns false if the store
/// was dropped meanwhile.
async fn wait_for_quiet<T>(rx: &mut watch::Receiver<T>, quiet: Duration) -> bool {
    loop {
        match tokio::time::timeout(quiet, rx.changed()).await {
            Ok(Ok(())) => continue,
            Ok(Err(_)) => return false,
            Err(_) => return true,
        }
    }
}

//! Run controller: at most one live execution session per workstation.
//!
//! Starting a run supersedes the previous one in a single step under the
//! controller lock: the old stream is cancelled, the old session is stopped
//! and released, and only then is the new run requested. Output of a
//! superseded session is dropped, so two sessions never interleave in the
//! terminal.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

use workstation_core::execution::{ExecutionBackend, ExecutionSession, StreamState};
use workstation_core::log::TerminalLine;
use workstation_core::Result;
use workstation_interaction::{StreamConsumer, StreamEvent};

use crate::file_sync::FileSyncDebouncer;
use crate::layout::Layout;
use crate::project_store::ProjectStore;

struct ActiveRun {
    run_id: u64,
    session: ExecutionSession,
    cancel: CancellationToken,
}

#[derive(Default)]
struct RunSlot {
    next_run_id: u64,
    active: Option<ActiveRun>,
}

pub struct RunController {
    backend: Arc<dyn ExecutionBackend>,
    store: Arc<ProjectStore>,
    layout: Arc<Layout>,
    sync: FileSyncDebouncer,
    slot: Arc<Mutex<RunSlot>>,
}

impl RunController {
    pub fn new(
        backend: Arc<dyn ExecutionBackend>,
        store: Arc<ProjectStore>,
        layout: Arc<Layout>,
        sync_delay: Duration,
    ) -> Self {
        Self {
            sync: FileSyncDebouncer::new(backend.clone(), sync_delay),
            backend,
            store,
            layout,
            slot: Arc::new(Mutex::new(RunSlot::default())),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.slot.lock().await.active.is_some()
    }

    pub async fn current_session(&self) -> Option<ExecutionSession> {
        self.slot
            .lock()
            .await
            .active
            .as_ref()
            .map(|run| run.session.clone())
    }

    /// Runs the current project tree, superseding any live session.
    ///
    /// Backend failures are written to the terminal and returned; the
    /// controller is idle afterwards.
    pub async fn start(&self) -> Result<ExecutionSession> {
        let mut slot = self.slot.lock().await;
        if let Some(previous) = slot.active.take() {
            tracing::info!(
                "[RunController] Superseding session {}",
                previous.session.session_id
            );
            self.shutdown(previous).await;
        }

        let files = self.store.snapshot().files.clone();
        self.terminal(TerminalLine::info("Starting project...")).await;

        let session = match self.backend.run(&files).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("[RunController] Run request failed: {}", e);
                self.terminal(TerminalLine::error(format!("Failed to start: {}", e)))
                    .await;
                return Err(e);
            }
        };

        tracing::info!(
            "[RunController] Session {} started ({}, port {})",
            session.session_id,
            session.project_type,
            session.port
        );
        let started = if session.message.is_empty() {
            format!("Session {} started", session.session_id)
        } else {
            session.message.clone()
        };
        self.terminal(TerminalLine::info(started)).await;

        slot.next_run_id += 1;
        let run_id = slot.next_run_id;
        let cancel = CancellationToken::new();
        self.spawn_stream(run_id, session.session_id.clone(), cancel.clone());

        slot.active = Some(ActiveRun {
            run_id,
            session: session.clone(),
            cancel,
        });
        Ok(session)
    }

    /// Stops the live session. A no-op when idle.
    pub async fn stop(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;
        let Some(run) = slot.active.take() else {
            tracing::debug!("[RunController] stop() while idle");
            return Ok(());
        };

        let session_id = run.session.session_id.clone();
        self.shutdown(run).await;
        self.terminal(TerminalLine::info(format!("Session {} stopped", session_id)))
            .await;
        Ok(())
    }

    /// Live-syncs an edit into the running session, debounced per path.
    /// Ignored when no session is live.
    pub async fn sync_file(&self, path: &str, content: &str) {
        // held across scheduling so a concurrent stop() cancels this edit too
        let slot = self.slot.lock().await;
        let Some(run) = slot.active.as_ref() else {
            return;
        };
        self.sync.schedule(&run.session.session_id, path, content).await;
    }

    /// Updates the file in the store and live-syncs it when running.
    pub async fn edit_file(&self, path: &str, content: &str) -> Result<()> {
        self.store.update_content(path, content).await?;
        self.sync_file(path, content).await;
        Ok(())
    }

    /// Cancels the stream and releases the session. Failures are logged only.
    async fn shutdown(&self, run: ActiveRun) {
        run.cancel.cancel();
        self.sync.cancel_all().await;

        let session_id = &run.session.session_id;
        if let Err(e) = self.backend.stop(session_id).await {
            tracing::warn!("[RunController] Failed to stop session {}: {}", session_id, e);
        }
        if let Err(e) = self.backend.release(session_id).await {
            tracing::warn!("[RunController] Failed to release session {}: {}", session_id, e);
        }
    }

    async fn terminal(&self, line: TerminalLine) {
        if let Err(e) = self.store.append_terminal_line(line).await {
            tracing::warn!("[RunController] Failed to record terminal line: {}", e);
        }
    }

    fn spawn_stream(&self, run_id: u64, session_id: String, cancel: CancellationToken) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let backend = self.backend.clone();
        let consumer_cancel = cancel.clone();
        let consumer_session = session_id.clone();
        tokio::spawn(async move {
            match backend.open_stream(&consumer_session).await {
                Ok(stream) => {
                    StreamConsumer::new(consumer_session, events_tx)
                        .run(stream, consumer_cancel)
                        .await;
                }
                Err(e) => {
                    let state = if consumer_cancel.is_cancelled() {
                        StreamState::Aborted
                    } else {
                        let _ = events_tx.send(StreamEvent::Error(e.to_string()));
                        StreamState::Errored
                    };
                    let _ = events_tx.send(StreamEvent::Finished(state));
                }
            }
        });

        tokio::spawn(forward_events(
            events_rx,
            run_id,
            session_id,
            cancel,
            self.store.clone(),
            self.layout.clone(),
            self.slot.clone(),
        ));
    }
}

/// Applies stream events to the terminal log and layout until the stream
/// finishes, then marks the controller idle if this run is still current.
///
/// Events already queued are drained together, so a burst of output lines
/// becomes a single store mutation.
async fn forward_events(
    mut events: mpsc::UnboundedReceiver<StreamEvent>,
    run_id: u64,
    session_id: String,
    cancel: CancellationToken,
    store: Arc<ProjectStore>,
    layout: Arc<Layout>,
    slot: Arc<Mutex<RunSlot>>,
) {
    while let Some(first) = events.recv().await {
        let mut batch = vec![first];
        while let Ok(next) = events.try_recv() {
            batch.push(next);
        }

        let mut lines = Vec::with_capacity(batch.len());
        let mut finished = false;
        for event in batch {
            let is_finished = matches!(event, StreamEvent::Finished(_));
            if cancel.is_cancelled() && !is_finished {
                continue;
            }

            match event {
                StreamEvent::Connected => {
                    tracing::debug!("[RunController] Stream connected for {}", session_id);
                }
                StreamEvent::Output(text) => lines.push(TerminalLine::output(text)),
                StreamEvent::Warning(text) => lines.push(TerminalLine::warning(text)),
                StreamEvent::Error(text) => {
                    lines.push(TerminalLine::error(format!("Stream error: {}", text)))
                }
                StreamEvent::PreviewReady => layout.show_preview(),
                StreamEvent::Finished(state) => {
                    tracing::info!("[RunController] Session {} stream ended: {:?}", session_id, state);
                    if state == StreamState::Ended {
                        lines.push(TerminalLine::info("Process finished"));
                    }
                    finished = true;
                    break;
                }
            }
        }

        if let Err(e) = store.append_terminal_lines(lines).await {
            tracing::warn!("[RunController] Failed to record terminal output: {}", e);
        }

        if finished {
            let mut slot = slot.lock().await;
            if slot.active.as_ref().is_some_and(|run| run.run_id == run_id) {
                slot.active = None;
            }
            break;
        }
    }
}

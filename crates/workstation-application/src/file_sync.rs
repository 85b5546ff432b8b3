//! Per-path trailing debounce for live-syncing edits into a running session.
//!
//! Each path has its own timer: a new edit to a path cancels only that
//! path's pending send, and the content sent is always the latest one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use workstation_core::execution::ExecutionBackend;

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct PendingMap {
    next_generation: u64,
    by_path: HashMap<String, Pending>,
}

pub struct FileSyncDebouncer {
    backend: Arc<dyn ExecutionBackend>,
    delay: Duration,
    pending: Arc<Mutex<PendingMap>>,
}

impl FileSyncDebouncer {
    pub fn new(backend: Arc<dyn ExecutionBackend>, delay: Duration) -> Self {
        Self {
            backend,
            delay,
            pending: Arc::new(Mutex::new(PendingMap::default())),
        }
    }

    /// Schedules `content` to be sent for `path` after the quiet period,
    /// replacing any send still pending for the same path.
    pub async fn schedule(&self, session_id: &str, path: &str, content: &str) {
        let mut pending = self.pending.lock().await;
        pending.next_generation += 1;
        let generation = pending.next_generation;

        if let Some(previous) = pending.by_path.remove(path) {
            previous.handle.abort();
        }

        let backend = self.backend.clone();
        let map = self.pending.clone();
        let delay = self.delay;
        let session_id = session_id.to_string();
        let key = path.to_string();
        let content = content.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if let Err(e) = backend.update_file(&session_id, &key, &content).await {
                tracing::warn!("[FileSync] Failed to sync {}: {}", key, e);
            } else {
                tracing::debug!("[FileSync] Synced {} to session {}", key, session_id);
            }

            let mut pending = map.lock().await;
            if pending
                .by_path
                .get(&key)
                .is_some_and(|p| p.generation == generation)
            {
                pending.by_path.remove(&key);
            }
        });

        pending
            .by_path
            .insert(path.to_string(), Pending { generation, handle });
    }

    /// Drops every pending send.
    pub async fn cancel_all(&self) {
        let mut pending = self.pending.lock().await;
        for (_, p) in pending.by_path.drain() {
            p.handle.abort();
        }
    }

    /// Number of paths with a send still pending.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.by_path.len()
    }
}

impl Drop for FileSyncDebouncer {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.try_lock() {
            for (_, p) in pending.by_path.drain() {
                p.handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::{StreamExt, stream};
    use workstation_core::Result;
    use workstation_core::execution::{ByteStream, ExecutionSession};
    use workstation_core::file_tree::FileTree;

    #[derive(Default)]
    struct RecordingBackend {
        updates: std::sync::Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingBackend {
        fn updates(&self) -> Vec<(String, String, String)> {
            self.updates.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExecutionBackend for RecordingBackend {
        async fn run(&self, _files: &FileTree) -> Result<ExecutionSession> {
            unreachable!("not used by file sync")
        }

        async fn stop(&self, _session_id: &str) -> Result<()> {
            Ok(())
        }

        async fn release(&self, _session_id: &str) -> Result<()> {
            Ok(())
        }

        async fn update_file(&self, session_id: &str, file_path: &str, content: &str) -> Result<()> {
            self.updates.lock().unwrap().push((
                session_id.to_string(),
                file_path.to_string(),
                content.to_string(),
            ));
            Ok(())
        }

        async fn open_stream(&self, _session_id: &str) -> Result<ByteStream> {
            Ok(stream::empty::<Result<Vec<u8>>>().boxed())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_edit_is_sent() {
        let backend = Arc::new(RecordingBackend::default());
        let sync = FileSyncDebouncer::new(backend.clone(), Duration::from_millis(300));

        sync.schedule("s1", "src/app.js", "a").await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        sync.schedule("s1", "src/app.js", "ab").await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        sync.schedule("s1", "src/app.js", "abc").await;

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(
            backend.updates(),
            vec![("s1".to_string(), "src/app.js".to_string(), "abc".to_string())]
        );
        assert_eq!(sync.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paths_do_not_cancel_each_other() {
        let backend = Arc::new(RecordingBackend::default());
        let sync = FileSyncDebouncer::new(backend.clone(), Duration::from_millis(300));

        sync.schedule("s1", "a.js", "1").await;
        sync.schedule("s1", "b.js", "2").await;
        assert_eq!(sync.pending_count().await, 2);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let mut paths: Vec<_> = backend.updates().into_iter().map(|(_, p, _)| p).collect();
        paths.sort();
        assert_eq!(paths, vec!["a.js", "b.js"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_drops_pending_sends() {
        let backend = Arc::new(RecordingBackend::default());
        let sync = FileSyncDebouncer::new(backend.clone(), Duration::from_millis(300));

        sync.schedule("s1", "a.js", "1").await;
        sync.cancel_all().await;

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(backend.updates().is_empty());
    }
}

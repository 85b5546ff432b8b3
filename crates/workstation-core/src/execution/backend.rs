//! Execution backend trait.

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::model::ExecutionSession;
use crate::error::Result;
use crate::file_tree::FileTree;

/// Raw body chunks of a session's output stream.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// The remote service that runs projects.
///
/// Implemented over HTTP by the interaction layer; tests substitute fakes.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Starts running `files` and returns the new session.
    async fn run(&self, files: &FileTree) -> Result<ExecutionSession>;

    /// Stops the session's process.
    async fn stop(&self, session_id: &str) -> Result<()>;

    /// Releases every backend resource held by the session.
    async fn release(&self, session_id: &str) -> Result<()>;

    /// Writes one file into the running session's working copy.
    async fn update_file(&self, session_id: &str, file_path: &str, content: &str) -> Result<()>;

    /// Opens the session's server-sent-event output stream.
    async fn open_stream(&self, session_id: &str) -> Result<ByteStream>;
}

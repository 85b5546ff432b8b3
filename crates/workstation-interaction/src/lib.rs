//! Clients for the remote collaborators of the workstation: the execution
//! API, its server-sent-event output stream, and the notebook kernel service.

pub mod execution_client;
pub mod notebook_client;
pub mod readiness;
pub mod stream;

mod http;

pub use execution_client::{ExecutionApiClient, normalize_file_path};
pub use notebook_client::NotebookClient;
pub use readiness::{ReadinessDetector, indicates_ready};
pub use stream::{Frame, FrameDecoder, StreamConsumer, StreamEvent};

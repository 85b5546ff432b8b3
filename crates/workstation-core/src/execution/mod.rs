//! Execution backend domain: sessions, stream states and the backend trait.

mod backend;
mod model;

pub use backend::{ByteStream, ExecutionBackend};
pub use model::{ExecutionSession, StreamState};

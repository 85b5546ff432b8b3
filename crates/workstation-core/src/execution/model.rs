//! Execution session domain models.

use serde::{Deserialize, Serialize};

use crate::project::ProjectType;

/// One run of the project on the execution backend.
///
/// The session id is opaque and assigned by the backend; it keys every
/// stop/update/stream request for this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSession {
    pub session_id: String,
    pub project_type: ProjectType,
    pub port: u16,
    pub message: String,
}

impl ExecutionSession {
    /// URL for the embedded browser preview of this session's dev server.
    pub fn preview_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Lifecycle of one output stream.
///
/// `Connecting -> Streaming -> {Ended | TimedOut | Errored | Aborted}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    Connecting,
    Streaming,
    Ended,
    TimedOut,
    Errored,
    Aborted,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Ended | Self::TimedOut | Self::Errored | Self::Aborted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_url() {
        let session = ExecutionSession {
            session_id: "abc".to_string(),
            project_type: ProjectType::Vite,
            port: 5173,
            message: String::new(),
        };
        assert_eq!(session.preview_url(), "http://localhost:5173");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!StreamState::Connecting.is_terminal());
        assert!(!StreamState::Streaming.is_terminal());
        assert!(StreamState::TimedOut.is_terminal());
        assert!(StreamState::Aborted.is_terminal());
    }
}

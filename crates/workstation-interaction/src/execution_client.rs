//! HTTP client for the execution API.
//!
//! Routes (relative to the configured base URL, e.g. `http://localhost:8000/api`):
//!
//! | Method | Route                          | Purpose                       |
//! |--------|--------------------------------|-------------------------------|
//! | POST   | `/projects/run`                | start a session               |
//! | POST   | `/projects/stop`               | stop the session's process    |
//! | DELETE | `/projects/session/{id}`       | release the session           |
//! | POST   | `/projects/update-file`        | live-sync one file            |
//! | GET    | `/projects/stream/{id}`        | SSE output stream             |
//!
//! Liveness is served from the server root (`/health`), outside the API prefix.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use workstation_core::config::ExecutionConfig;
use workstation_core::execution::{ByteStream, ExecutionBackend, ExecutionSession};
use workstation_core::file_tree::FileTree;
use workstation_core::project::ProjectType;
use workstation_core::{Result, WorkstationError};

use crate::http::{join_url, send, send_json};

const API_PREFIX: &str = "/api";

#[derive(Serialize)]
struct RunRequest<'a> {
    files: &'a FileTree,
}

#[derive(Deserialize)]
struct RunResponse {
    session_id: String,
    project_type: String,
    port: u16,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct StopRequest<'a> {
    session_id: &'a str,
}

#[derive(Serialize)]
struct UpdateFileRequest<'a> {
    session_id: &'a str,
    file_path: &'a str,
    content: &'a str,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Normalizes a tree path for `update-file`.
///
/// Backslashes become `/` and leading slashes are stripped. Paths containing
/// `..` anywhere, or nothing at all, are rejected.
pub fn normalize_file_path(path: &str) -> Result<String> {
    let normalized = path.replace('\\', "/");
    let normalized = normalized.trim_start_matches('/');

    // the backend refuses any `..`, not only whole segments
    if normalized.contains("..") {
        return Err(WorkstationError::InvalidPath(format!(
            "'{}' contains '..'",
            path
        )));
    }
    if normalized.is_empty() {
        return Err(WorkstationError::InvalidPath("empty file path".to_string()));
    }
    Ok(normalized.to_string())
}

/// reqwest-backed [`ExecutionBackend`].
#[derive(Clone)]
pub struct ExecutionApiClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl ExecutionApiClient {
    pub fn new(config: &ExecutionConfig) -> Result<Self> {
        // No overall client timeout: the output stream stays open for the
        // whole run. Plain requests get a per-request timeout instead.
        let client = Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|err| WorkstationError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            request_timeout: config.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        join_url(&self.base_url, route)
    }

    fn health_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let root = base.strip_suffix(API_PREFIX).unwrap_or(base);
        join_url(root, "health")
    }

    /// Checks that the execution server is up.
    pub async fn health(&self) -> Result<HealthStatus> {
        send_json(
            self.client
                .get(self.health_url())
                .timeout(self.request_timeout),
        )
        .await
    }
}

#[async_trait]
impl ExecutionBackend for ExecutionApiClient {
    async fn run(&self, files: &FileTree) -> Result<ExecutionSession> {
        tracing::debug!("[ExecutionApiClient] POST /projects/run ({} roots)", files.roots().len());

        let response: RunResponse = send_json(
            self.client
                .post(self.url("/projects/run"))
                .timeout(self.request_timeout)
                .json(&RunRequest { files }),
        )
        .await?;

        Ok(ExecutionSession {
            project_type: ProjectType::from_wire(&response.project_type),
            session_id: response.session_id,
            port: response.port,
            message: response.message,
        })
    }

    async fn stop(&self, session_id: &str) -> Result<()> {
        tracing::debug!("[ExecutionApiClient] POST /projects/stop {}", session_id);
        send(
            self.client
                .post(self.url("/projects/stop"))
                .timeout(self.request_timeout)
                .json(&StopRequest { session_id }),
        )
        .await?;
        Ok(())
    }

    async fn release(&self, session_id: &str) -> Result<()> {
        tracing::debug!("[ExecutionApiClient] DELETE /projects/session/{}", session_id);
        send(
            self.client
                .delete(self.url(&format!("/projects/session/{session_id}")))
                .timeout(self.request_timeout),
        )
        .await?;
        Ok(())
    }

    async fn update_file(&self, session_id: &str, file_path: &str, content: &str) -> Result<()> {
        let file_path = normalize_file_path(file_path)?;
        tracing::debug!(
            "[ExecutionApiClient] POST /projects/update-file {} ({} bytes)",
            file_path,
            content.len()
        );
        send(
            self.client
                .post(self.url("/projects/update-file"))
                .timeout(self.request_timeout)
                .json(&UpdateFileRequest {
                    session_id,
                    file_path: &file_path,
                    content,
                }),
        )
        .await?;
        Ok(())
    }

    async fn open_stream(&self, session_id: &str) -> Result<ByteStream> {
        tracing::debug!("[ExecutionApiClient] GET /projects/stream/{}", session_id);
        let response = send(
            self.client
                .get(self.url(&format!("/projects/stream/{session_id}")))
                .header(ACCEPT, "text/event-stream"),
        )
        .await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|err| WorkstationError::Stream(err.to_string()))
            })
            .boxed())
    }
}

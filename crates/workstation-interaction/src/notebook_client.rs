//! Client for the notebook kernel service (`/notebook/...`).
//!
//! Kernel sessions are independent of project run sessions. Cell outputs are
//! passed through as raw Jupyter output objects.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use workstation_core::config::ExecutionConfig;
use workstation_core::file_tree::FileTree;
use workstation_core::{Result, WorkstationError};

use crate::execution_client::normalize_file_path;
use crate::http::{join_url, send_json};

/// Default per-cell execution timeout, in seconds.
pub const DEFAULT_CELL_TIMEOUT_SECS: f64 = 60.0;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateKernelRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<&'a FileTree>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements_txt: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateKernelResponse {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
struct ExecuteCellRequest<'a> {
    session_id: &'a str,
    code: &'a str,
    timeout: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CellExecution {
    pub execution_count: u32,
    pub outputs: Vec<Value>,
    pub status: String,
}

impl CellExecution {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Concatenated stream text and `text/plain` results.
    pub fn text(&self) -> String {
        self.outputs.iter().map(output_text).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KernelSessionInfo {
    pub session_id: String,
    pub execution_count: u32,
    pub created_at: String,
    pub last_activity: String,
    pub is_alive: bool,
    #[serde(default)]
    pub has_project: bool,
}

#[derive(Deserialize)]
struct KernelSessionList {
    sessions: Vec<KernelSessionInfo>,
}

#[derive(Debug, Clone, Serialize)]
struct InstallPackagesRequest<'a> {
    session_id: &'a str,
    packages: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstallPackagesResponse {
    pub success: bool,
    pub installed: Vec<String>,
    pub failed: Vec<String>,
    pub output: String,
}

#[derive(Serialize)]
struct UpdateFileRequest<'a> {
    session_id: &'a str,
    file_path: &'a str,
    content: &'a str,
}

/// `{ "success": true, "message": "..." }` acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Extracts the readable text of one Jupyter output object.
fn output_text(output: &Value) -> String {
    fn joined(value: &Value) -> String {
        match value {
            Value::String(text) => text.clone(),
            Value::Array(parts) => parts.iter().filter_map(Value::as_str).collect(),
            _ => String::new(),
        }
    }

    if let Some(text) = output.get("text") {
        return joined(text);
    }
    output
        .get("data")
        .and_then(|data| data.get("text/plain"))
        .map(joined)
        .unwrap_or_default()
}

// ============================================================================
// Client
// ============================================================================

#[derive(Clone)]
pub struct NotebookClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl NotebookClient {
    pub fn new(config: &ExecutionConfig) -> Result<Self> {
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

    fn url(&self, route: &str) -> String {
        join_url(&self.base_url, &format!("/notebook/{}", route.trim_start_matches('/')))
    }

    /// Starts a kernel, optionally seeded with project files and requirements.
    pub async fn create_session(
        &self,
        files: Option<&FileTree>,
        requirements_txt: Option<&str>,
    ) -> Result<CreateKernelResponse> {
        tracing::debug!("[NotebookClient] Creating kernel session");
        send_json(
            self.client
                .post(self.url("sessions"))
                .timeout(self.request_timeout)
                .json(&CreateKernelRequest {
                    files,
                    requirements_txt,
                }),
        )
        .await
    }

    /// Runs `code` in the kernel. The HTTP timeout is extended by the cell timeout.
    pub async fn execute(
        &self,
        session_id: &str,
        code: &str,
        timeout_secs: Option<f64>,
    ) -> Result<CellExecution> {
        let timeout = timeout_secs.unwrap_or(DEFAULT_CELL_TIMEOUT_SECS).max(0.0);
        send_json(
            self.client
                .post(self.url("execute"))
                .timeout(self.request_timeout + Duration::from_secs_f64(timeout))
                .json(&ExecuteCellRequest {
                    session_id,
                    code,
                    timeout,
                }),
        )
        .await
    }

    pub async fn list_sessions(&self) -> Result<Vec<KernelSessionInfo>> {
        let list: KernelSessionList = send_json(
            self.client
                .get(self.url("sessions"))
                .timeout(self.request_timeout),
        )
        .await?;
        Ok(list.sessions)
    }

    pub async fn session_info(&self, session_id: &str) -> Result<KernelSessionInfo> {
        send_json(
            self.client
                .get(self.url(&format!("sessions/{session_id}")))
                .timeout(self.request_timeout),
        )
        .await
    }

    pub async fn interrupt(&self, session_id: &str) -> Result<Acknowledgement> {
        send_json(
            self.client
                .post(self.url(&format!("sessions/{session_id}/interrupt")))
                .timeout(self.request_timeout),
        )
        .await
    }

    pub async fn restart(&self, session_id: &str) -> Result<Acknowledgement> {
        send_json(
            self.client
                .post(self.url(&format!("sessions/{session_id}/restart")))
                .timeout(self.request_timeout),
        )
        .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<Acknowledgement> {
        tracing::debug!("[NotebookClient] Deleting kernel session {}", session_id);
        send_json(
            self.client
                .delete(self.url(&format!("sessions/{session_id}")))
                .timeout(self.request_timeout),
        )
        .await
    }

    /// Installs packages into the kernel environment. Installs can be slow,
    /// so this waits up to five minutes.
    pub async fn install(&self, session_id: &str, packages: &[String]) -> Result<InstallPackagesResponse> {
        send_json(
            self.client
                .post(self.url("install"))
                .timeout(self.request_timeout + Duration::from_secs(300))
                .json(&InstallPackagesRequest {
                    session_id,
                    packages,
                }),
        )
        .await
    }

    pub async fn update_file(&self, session_id: &str, file_path: &str, content: &str) -> Result<Acknowledgement> {
        let file_path = normalize_file_path(file_path)?;
        send_json(
            self.client
                .post(self.url("update-file"))
                .timeout(self.request_timeout)
                .json(&UpdateFileRequest {
                    session_id,
                    file_path: &file_path,
                    content,
                }),
        )
        .await
    }
}

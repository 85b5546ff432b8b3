//! ProjectState DTOs and migrations
//!
//! This module defines the versioned shapes of the persisted project blob.
//!
//! ## Version History
//! - **1.0.0**: files, plain-text chat transcript and plain-text terminal
//! - **1.1.0**: structured terminal lines, chat messages with roles, AI model settings
//! - **1.2.0**: opened editor tabs

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use version_migrate::{FromDomain, IntoDomain, Versioned};

use workstation_core::editor::{OpenedFile, OpenedFiles};
use workstation_core::file_tree::{FileNode, FileTree};
use workstation_core::log::{AppendLog, ChatMessage, LineKind, TerminalLine};
use workstation_core::project::{AiModelConfig, DEFAULT_AI_MODEL_ID, ProjectState};

/// Entity name the migration path is registered under.
pub const PROJECT_STATE_ENTITY: &str = "project_state";

/// Version assumed for blobs written before versioning existed.
pub const UNVERSIONED_BLOB_VERSION: &str = "1.0.0";

fn default_ai_model_id() -> String {
    DEFAULT_AI_MODEL_ID.to_string()
}

// ============================================================================
// Field-level repair
// ============================================================================
//
// A stored field that no longer matches its type is replaced by its default
// (list fields keep their valid entries), so one bad field never discards the
// rest of the blob.

fn parse_or_warn<T: DeserializeOwned>(value: Value, field: &str) -> Option<T> {
    serde_json::from_value(value)
        .inspect_err(|e| {
            tracing::warn!("[ProjectStateDTO] Dropping invalid '{}' value: {}", field, e);
        })
        .ok()
}

fn lenient_list<T: DeserializeOwned>(value: Value, field: &str) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| parse_or_warn(item, field))
            .collect(),
        Value::Null => Vec::new(),
        other => parse_or_warn(other, field).unwrap_or_default(),
    }
}

fn lenient_files<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FileTree, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(FileTree::new(lenient_list::<FileNode>(value, "files")))
}

fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(lenient_list(Value::deserialize(deserializer)?, "chat"))
}

fn lenient_terminal<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<TerminalLine>, D::Error> {
    Ok(lenient_list(Value::deserialize(deserializer)?, "terminal"))
}

fn lenient_chat_messages<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ChatMessage>, D::Error> {
    Ok(lenient_list(Value::deserialize(deserializer)?, "chatMessages"))
}

fn lenient_opened_files<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<OpenedFile>, D::Error> {
    Ok(lenient_list(Value::deserialize(deserializer)?, "openedFiles"))
}

fn lenient_ai_model_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_or_warn(value, "aiModelId").unwrap_or_else(default_ai_model_id))
}

fn lenient_ai_model_config<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<AiModelConfig, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_or_warn(value, "aiModelConfig").unwrap_or_default())
}

/// Project state V1.0.0 (initial version).
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ProjectStateV1_0 {
    #[serde(default, deserialize_with = "lenient_files")]
    pub files: FileTree,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub chat: Vec<String>,
    /// Terminal output as plain lines.
    #[serde(default, deserialize_with = "lenient_strings")]
    pub terminal: Vec<String>,
}

/// Project state V1.1.0.
///
/// Terminal lines carry a kind and timestamp; chat messages carry a role.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
#[serde(rename_all = "camelCase")]
pub struct ProjectStateV1_1 {
    #[serde(default, deserialize_with = "lenient_files")]
    pub files: FileTree,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub chat: Vec<String>,
    #[serde(default, deserialize_with = "lenient_terminal")]
    pub terminal: Vec<TerminalLine>,
    #[serde(default, deserialize_with = "lenient_chat_messages")]
    pub chat_messages: Vec<ChatMessage>,
    #[serde(default = "default_ai_model_id", deserialize_with = "lenient_ai_model_id")]
    pub ai_model_id: String,
    #[serde(default, deserialize_with = "lenient_ai_model_config")]
    pub ai_model_config: AiModelConfig,
}

/// Project state V1.2.0.
///
/// Added opened editor tabs.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.2.0")]
#[serde(rename_all = "camelCase")]
pub struct ProjectStateV1_2 {
    #[serde(default, deserialize_with = "lenient_files")]
    pub files: FileTree,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub chat: Vec<String>,
    #[serde(default, deserialize_with = "lenient_terminal")]
    pub terminal: Vec<TerminalLine>,
    #[serde(default, deserialize_with = "lenient_chat_messages")]
    pub chat_messages: Vec<ChatMessage>,
    #[serde(default = "default_ai_model_id", deserialize_with = "lenient_ai_model_id")]
    pub ai_model_id: String,
    #[serde(default, deserialize_with = "lenient_ai_model_config")]
    pub ai_model_config: AiModelConfig,
    #[serde(default, deserialize_with = "lenient_opened_files")]
    pub opened_files: Vec<OpenedFile>,
}

/// Type alias for the latest ProjectState version.
pub type ProjectStateDTO = ProjectStateV1_2;

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from ProjectStateV1_0 to ProjectStateV1_1.
/// Plain terminal lines become untimestamped output lines.
impl version_migrate::MigratesTo<ProjectStateV1_1> for ProjectStateV1_0 {
    fn migrate(self) -> ProjectStateV1_1 {
        ProjectStateV1_1 {
            files: self.files,
            chat: self.chat,
            terminal: self
                .terminal
                .into_iter()
                .map(|text| TerminalLine {
                    kind: LineKind::Output,
                    text,
                    timestamp: None,
                })
                .collect(),
            chat_messages: Vec::new(),
            ai_model_id: default_ai_model_id(),
            ai_model_config: AiModelConfig::default(),
        }
    }
}

/// Migration from ProjectStateV1_1 to ProjectStateV1_2.
/// Adds opened_files with no tabs open.
impl version_migrate::MigratesTo<ProjectStateV1_2> for ProjectStateV1_1 {
    fn migrate(self) -> ProjectStateV1_2 {
        ProjectStateV1_2 {
            files: self.files,
            chat: self.chat,
            terminal: self.terminal,
            chat_messages: self.chat_messages,
            ai_model_id: self.ai_model_id,
            ai_model_config: self.ai_model_config,
            opened_files: Vec::new(),
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

/// Convert ProjectStateV1_2 DTO to domain model.
impl IntoDomain<ProjectState> for ProjectStateV1_2 {
    fn into_domain(self) -> ProjectState {
        ProjectState {
            files: self.files,
            chat: self.chat,
            terminal: AppendLog::from(self.terminal),
            chat_messages: AppendLog::from(self.chat_messages),
            ai_model_id: self.ai_model_id,
            ai_model_config: self.ai_model_config,
            opened_files: OpenedFiles::from(self.opened_files),
        }
    }
}

/// Convert domain model to ProjectStateV1_2 DTO for persistence.
impl FromDomain<ProjectState> for ProjectStateV1_2 {
    fn from_domain(state: ProjectState) -> Self {
        ProjectStateV1_2 {
            files: state.files,
            chat: state.chat,
            terminal: state.terminal.iter().cloned().collect(),
            chat_messages: state.chat_messages.iter().cloned().collect(),
            ai_model_id: state.ai_model_id,
            ai_model_config: state.ai_model_config,
            opened_files: state.opened_files.iter().cloned().collect(),
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for ProjectState entities.
///
/// # Migration Path
///
/// - V1.0 → V1.1: Structures terminal lines, adds chat messages and AI model settings
/// - V1.1 → V1.2: Adds `opened_files` (empty)
/// - V1.2 → ProjectState: Converts DTO to domain model
pub fn create_project_state_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let project_state_path = version_migrate::Migrator::define(PROJECT_STATE_ENTITY)
        .from::<ProjectStateV1_0>()
        .step::<ProjectStateV1_1>()
        .step::<ProjectStateV1_2>()
        .into_with_save::<ProjectState>();

    migrator
        .register(project_state_path)
        .expect("Failed to register project_state migration path");

    migrator
}

/// Decodes a stored blob into the domain model.
///
/// Never fails: a blob without a `version` field is read as the first
/// schema, and fields that do not match their type fall back to their
/// defaults one by one. Only input that is not a JSON object, or carries an
/// unknown version, is replaced by the default state.
pub fn decode_project_state(migrator: &version_migrate::Migrator, blob: &str) -> ProjectState {
    let mut value: Value = match serde_json::from_str(blob) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("[ProjectStateDTO] Stored state is not JSON, using defaults: {}", e);
            return ProjectState::default();
        }
    };

    let Some(object) = value.as_object_mut() else {
        tracing::warn!("[ProjectStateDTO] Stored state is not an object, using defaults");
        return ProjectState::default();
    };
    if !object.contains_key("version") {
        object.insert(
            "version".to_string(),
            Value::String(UNVERSIONED_BLOB_VERSION.to_string()),
        );
    }

    match migrator.load_flat_from(PROJECT_STATE_ENTITY, value) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!("[ProjectStateDTO] Failed to migrate stored state, using defaults: {}", e);
            ProjectState::default()
        }
    }
}

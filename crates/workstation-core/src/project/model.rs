//! Project state domain models.

use serde::{Deserialize, Serialize};

use crate::editor::OpenedFiles;
use crate::file_tree::FileTree;
use crate::log::{AppendLog, ChatMessage, TerminalLine};

pub const DEFAULT_AI_MODEL_ID: &str = "gpt-4o-mini";

/// Settings forwarded to the assist backend. Not interpreted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiModelConfig {
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Default for AiModelConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_AI_MODEL_ID.to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            system_prompt: "You are a helpful coding assistant.".to_string(),
        }
    }
}

/// Root aggregate for one editor instance.
///
/// This is exactly the persisted subset; transient UI state (panel
/// visibility, selection) is kept elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub files: FileTree,
    /// Plain-text chat transcript.
    pub chat: Vec<String>,
    pub terminal: AppendLog<TerminalLine>,
    pub chat_messages: AppendLog<ChatMessage>,
    pub ai_model_id: String,
    pub ai_model_config: AiModelConfig,
    pub opened_files: OpenedFiles,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self {
            files: FileTree::default(),
            chat: Vec::new(),
            terminal: AppendLog::new(),
            chat_messages: AppendLog::new(),
            ai_model_id: DEFAULT_AI_MODEL_ID.to_string(),
            ai_model_config: AiModelConfig::default(),
            opened_files: OpenedFiles::new(),
        }
    }
}

impl ProjectState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh state for a newly loaded project tree.
    pub fn with_files(files: FileTree) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }
}

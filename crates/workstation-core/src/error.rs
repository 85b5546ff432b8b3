//! Error types for the Workstation crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every Workstation layer.
///
/// Variants are typed and structured so UI-facing callers can react to a
/// specific failure (e.g. show a toast for `PathNotFound`) instead of parsing
/// messages. Common library errors convert automatically through `From`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkstationError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A tree path did not resolve to a node
    #[error("Path not found: '{path}'")]
    PathNotFound { path: String },

    /// A create targeted a parent that is a file
    #[error("Parent is not a folder: '{path}'")]
    ParentNotFolder { path: String },

    /// A content update targeted a folder
    #[error("Not a file: '{path}'")]
    NotAFile { path: String },

    /// A sibling with the same name already exists
    #[error("Duplicate name '{name}' in '{parent}'")]
    DuplicateName { parent: String, name: String },

    /// The node is marked as not editable
    #[error("File is read-only: '{path}'")]
    ReadOnly { path: String },

    /// The path is empty or otherwise unusable for the requested operation
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// The backend could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Output stream read failure (not a user abort)
    #[error("Stream error: {0}")]
    Stream(String),

    /// Notebook content could not be parsed
    #[error("Invalid notebook format: {0}")]
    InvalidNotebook(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkstationError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a PathNotFound error
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Backend error
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound or PathNotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::PathNotFound { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if the backend was unreachable or refused the request
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Backend { .. })
    }

    /// Check if this error came from a tree operation
    pub fn is_tree_error(&self) -> bool {
        matches!(
            self,
            Self::PathNotFound { .. }
                | Self::ParentNotFolder { .. }
                | Self::NotAFile { .. }
                | Self::DuplicateName { .. }
                | Self::ReadOnly { .. }
                | Self::InvalidPath(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WorkstationError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WorkstationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WorkstationError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for WorkstationError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for WorkstationError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::EntityNotFound(id) => Self::not_found("entity", id),
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            _ => Self::Migration(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for WorkstationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, WorkstationError>`.
pub type Result<T> = std::result::Result<T, WorkstationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_error_classification() {
        assert!(WorkstationError::path_not_found("src/app.js").is_tree_error());
        assert!(WorkstationError::path_not_found("src/app.js").is_not_found());
        assert!(!WorkstationError::network("refused").is_tree_error());
        assert!(WorkstationError::backend(500, "boom").is_remote());
    }

    #[test]
    fn test_invalid_notebook_message() {
        let err = WorkstationError::InvalidNotebook("expected value".to_string());
        assert!(err.to_string().starts_with("Invalid notebook format"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: WorkstationError = io.into();
        assert!(err.is_io());
    }
}

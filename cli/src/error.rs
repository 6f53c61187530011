//! Command error types for the CLI
//!
//! Structured errors that serialize to `{"code": "...", "message": "..."}` for
//! `--json` output and map to process exit codes.

use notewell_core::{ConfigError, ImportError, StoreError};
use serde::Serialize;

/// Errors returned by CLI commands
///
/// Each variant serializes with a snake_case `code` field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum CommandError {
    InvalidSettings { message: String },
    AlreadyRunning { message: String },
    LogNotFound { message: String },
    StorageError { message: String },
    InternalError { message: String },
}

impl CommandError {
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }

    pub fn log_not_found() -> Self {
        Self::LogNotFound {
            message: "Import log was not written".to_string(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Process exit code: 2 for bad settings, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidSettings { .. } => 2,
            _ => 1,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidSettings { message }
            | Self::AlreadyRunning { message }
            | Self::LogNotFound { message }
            | Self::StorageError { message }
            | Self::InternalError { message } => message,
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for CommandError {}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        Self::invalid_settings(err.to_string())
    }
}

impl From<ImportError> for CommandError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Config(e) => e.into(),
            ImportError::AlreadyRunning => Self::AlreadyRunning {
                message: err.to_string(),
            },
            ImportError::Scan(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        Self::storage(err.to_string())
    }
}

/// Result type alias for commands
pub type CommandResult<T> = Result<T, CommandError>;

//! Error types for rollout
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown task, bad config)
//! - 3: Catalog integrity failure (duplicate ids, weights off)
//! - 4: Operation failed (io, json, lock timeout)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the rollout CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const CATALOG_INVALID: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for rollout operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Subtask not found: {subtask} (task {task})")]
    SubtaskNotFound { task: String, subtask: String },

    #[error("Invalid color for {category}: '{value}' (expected #rrggbb)")]
    InvalidColor { category: String, value: String },

    // Catalog integrity (exit code 3)
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidDate(_)
            | Error::TaskNotFound(_)
            | Error::SubtaskNotFound { .. }
            | Error::InvalidColor { .. } => exit_codes::USER_ERROR,

            Error::InvalidCatalog(_) => exit_codes::CATALOG_INVALID,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for the JSON error envelope, when the variant has any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::TaskNotFound(id) => Some(serde_json::json!({ "task": id })),
            Error::SubtaskNotFound { task, subtask } => {
                Some(serde_json::json!({ "task": task, "subtask": subtask }))
            }
            Error::InvalidColor { category, value } => {
                Some(serde_json::json!({ "category": category, "value": value }))
            }
            Error::LockFailed(path) => {
                Some(serde_json::json!({ "path": path.to_string_lossy() }))
            }
            _ => None,
        }
    }
}

/// Result type alias for rollout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}

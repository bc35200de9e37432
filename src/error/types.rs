//! Error types
//!
//! Defines domain-specific error types for each module of the file service.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Convenience alias for results returned by the file engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// File engine errors.
///
/// Every engine operation returns exactly one of these or a success payload.
/// `AccessDenied` is a boundary violation and stays distinct from `NotFound`
/// so the adapter can decide how much to disclose.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Access denied: {0} is outside the allowed directory")]
    AccessDenied(String),

    #[error("File too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    /// Classifies an I/O error raised while touching `path`.
    pub fn from_io(error: io::Error, path: &Path) -> Self {
        let display = path.display().to_string();
        match error.kind() {
            io::ErrorKind::NotFound => EngineError::NotFound(display),
            io::ErrorKind::AlreadyExists => EngineError::AlreadyExists(display),
            io::ErrorKind::PermissionDenied => EngineError::PermissionDenied(display),
            io::ErrorKind::NotADirectory => EngineError::NotADirectory(display),
            io::ErrorKind::IsADirectory => EngineError::NotAFile(display),
            _ => EngineError::Io {
                path: display,
                source: error,
            },
        }
    }

    /// Stable machine-readable name of the error variant.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "not_found",
            EngineError::AlreadyExists(_) => "already_exists",
            EngineError::NotADirectory(_) => "not_a_directory",
            EngineError::NotAFile(_) => "not_a_file",
            EngineError::PermissionDenied(_) => "permission_denied",
            EngineError::AccessDenied(_) => "access_denied",
            EngineError::TooLarge { .. } => "too_large",
            EngineError::InvalidPattern { .. } => "invalid_pattern",
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::Io { .. } => "io_error",
        }
    }
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid password for user: {0}")]
    InvalidPassword(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("User not logged in")]
    NotLoggedIn,
}

/// Wire protocol errors raised before a request reaches the engine.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Empty request")]
    EmptyRequest,

    #[error("Request too long: {length} bytes (max {max})")]
    RequestTooLong { length: usize, max: usize },

    #[error("Malformed request: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(error: serde_json::Error) -> Self {
        ProtocolError::Malformed(error.to_string())
    }
}

/// General server error that encompasses all error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

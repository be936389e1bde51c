//! Error types for docsearch.
//!
//! Every fallible library operation returns [`DocSearchError`]; the binary maps
//! these onto JSON-RPC error codes when serving requests.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the docsearch library.
#[derive(Debug, Error)]
pub enum DocSearchError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The payload parsed as JSON but does not have the search index shape.
    #[error("Malformed search index: {message}")]
    Format { message: String },

    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("Entry not found: {location}")]
    EntryNotFound { location: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("Method not found: {0}")]
    MethodNotFound(String),
}

/// Result type alias for docsearch operations.
pub type Result<T> = std::result::Result<T, DocSearchError>;

impl From<std::io::Error> for DocSearchError {
    fn from(err: std::io::Error) -> Self {
        DocSearchError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for DocSearchError {
    fn from(err: serde_json::Error) -> Self {
        DocSearchError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for DocSearchError {
    fn from(err: rusqlite::Error) -> Self {
        DocSearchError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl DocSearchError {
    /// Create an IO error with path context.
    ///
    /// A missing file becomes [`DocSearchError::FileNotFound`] so callers can
    /// report it without digging into the io error kind.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            return DocSearchError::FileNotFound(path);
        }
        DocSearchError::Io {
            message: err.to_string(),
            path: Some(path),
            source: Some(err),
        }
    }

    /// Shorthand for a [`DocSearchError::Format`] error.
    pub fn format(message: impl Into<String>) -> Self {
        DocSearchError::Format {
            message: message.into(),
        }
    }

    /// Error raised when the shared connection mutex is poisoned.
    pub(crate) fn lock_poisoned() -> Self {
        DocSearchError::Database {
            message: "Failed to acquire connection lock".to_string(),
            source: None,
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Standard codes:
    /// - -32700: Parse error
    /// - -32601: Method not found
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Application codes:
    /// - -32002: Entry not found
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            DocSearchError::Json { .. } | DocSearchError::Format { .. } => -32700,

            DocSearchError::EntryNotFound { .. } => -32002,

            DocSearchError::MethodNotFound(_) => -32601,

            DocSearchError::InvalidParams { .. } => -32602,

            _ => -32603,
        }
    }
}

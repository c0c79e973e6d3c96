// crates/file-search/src/error.rs
// Standardized error types for file-search

use crate::constants::ResourceKind;
use thiserror::Error;

/// Main error type for the file-search library
#[derive(Error, Debug)]
pub enum FileSearchError {
    #[error("{kind} not found: {reference}")]
    NotFound {
        kind: ResourceKind,
        reference: String,
    },

    #[error("document not found in store {store}: {reference}")]
    DocumentNotFound { store: String, reference: String },

    /// A command needed one of two reference forms and got neither
    #[error("{0}")]
    MissingReference(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("operation {name} failed: {message}")]
    OperationFailed { name: String, message: String },

    #[error("invalid operation name: {0}")]
    InvalidOperationName(String),

    #[error("operation {name} is not an {expected} operation")]
    OperationKindMismatch { name: String, expected: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "API key not set. Use --api-key, --api-key-env, the config file, or GOOGLE_API_KEY/GEMINI_API_KEY"
    )]
    MissingApiKey,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("task cancelled")]
    Cancelled,
}

/// Convenience type alias for Result using FileSearchError
pub type Result<T> = std::result::Result<T, FileSearchError>;

impl FileSearchError {
    /// True for network-level failures (connect, timeout, body decode).
    /// Remote rejections carry a status code and are not transport errors.
    pub fn is_transport(&self) -> bool {
        matches!(self, FileSearchError::Http(_))
    }

    /// True when the backend answered but refused the request or the
    /// snapshot belonged to the other operation kind.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FileSearchError::Api { .. } | FileSearchError::OperationKindMismatch { .. }
        )
    }

    /// Convert to user-facing string for MCP tool boundaries
    pub fn to_user_string(&self) -> String {
        self.to_string()
    }
}

impl From<FileSearchError> for String {
    fn from(err: FileSearchError) -> Self {
        err.to_string()
    }
}

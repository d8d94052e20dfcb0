//! Error types module
//!
//! All errors raised by the client are unified under the `ClientError` enum:
//! payload validation, remote service failures, duration parsing, and
//! persistence errors. Per-item failures inside a download batch are not
//! raised; they are collected into the batch report instead.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no file or text payload provided")]
    MissingPayload,

    #[error("file and text payloads are mutually exclusive")]
    ConflictingPayload,

    #[error("invalid file reference (missing or a symlink): {0}")]
    InvalidFileReference(PathBuf),

    #[error("remote service reported not found")]
    RemoteNotFound,

    #[error("remote service reported rate limiting")]
    RemoteRateLimited,

    #[error("remote service error: {code}")]
    RemoteUnknown { code: String },

    #[error("unsupported duration: {0}")]
    UnsupportedDurationUnit(String),

    #[error("serialization format error: {0}")]
    SerializationFormat(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::SerializationFormat(err.to_string())
    }
}

impl ClientError {
    /// Machine-readable error code (e.g., "MISSING_PAYLOAD")
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::MissingPayload => "MISSING_PAYLOAD",
            ClientError::ConflictingPayload => "CONFLICTING_PAYLOAD",
            ClientError::InvalidFileReference(_) => "INVALID_FILE_REFERENCE",
            ClientError::RemoteNotFound => "REMOTE_NOT_FOUND",
            ClientError::RemoteRateLimited => "REMOTE_RATE_LIMITED",
            ClientError::RemoteUnknown { .. } => "REMOTE_UNKNOWN_ERROR",
            ClientError::UnsupportedDurationUnit(_) => "UNSUPPORTED_DURATION_UNIT",
            ClientError::SerializationFormat(_) => "SERIALIZATION_FORMAT_ERROR",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether retrying the same call could succeed. The client itself
    /// never retries; callers own retry policy.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClientError::RemoteRateLimited | ClientError::Transport(_) | ClientError::Io(_)
        )
    }
}

//! Error types for sceneterm
//!
//! Provides a unified error type used across all sceneterm crates.

use std::io::ErrorKind;
use std::path::PathBuf;

use sceneterm_protocol::CodecError;

/// Main error type for sceneterm operations
#[derive(Debug, thiserror::Error)]
pub enum SceneTermError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Connection Errors ===

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {millis}ms")]
    ConnectionTimeout { millis: u64 },

    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    // === Protocol Errors ===

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Protocol version mismatch: client={client}, server={server}")]
    ProtocolMismatch { client: u32, server: u32 },

    #[error("Request {kind} rejected: {reason}")]
    Rejected { kind: String, reason: String },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SceneTermError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The connection is unusable and must be dropped and re-dialed
    pub fn is_transport_terminal(&self) -> bool {
        match self {
            Self::ConnectionClosed | Self::ConnectionTimeout { .. } => true,
            Self::Io(e) => matches!(
                e.kind(),
                ErrorKind::UnexpectedEof
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.is_transport_terminal() || matches!(self, Self::Connection(_))
    }
}

impl From<CodecError> for SceneTermError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => Self::Io(e),
            CodecError::VersionMismatch { expected, found } => Self::ProtocolMismatch {
                client: expected,
                server: found,
            },
            CodecError::UnknownKind(_) | CodecError::KindMismatch { .. } => {
                Self::InvalidMessage(err.to_string())
            }
            other => Self::Protocol(other.to_string()),
        }
    }
}

/// Result type alias using SceneTermError
pub type Result<T> = std::result::Result<T, SceneTermError>;

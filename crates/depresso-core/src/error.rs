//! Error handling for depressoAssist
//!
//! Provides error types for the layers that can fail:
//! - Connection errors (HTTP and WebSocket communication with the backend)
//! - Upload errors (media validation before anything is sent)
//!
//! All error types use `thiserror`. The event bus itself has no error path;
//! a panicking subscriber is contained inside the bus.

use thiserror::Error;

/// Connection error type
///
/// Represents failures talking to the analysis and chat backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Socket is not open
    #[error("Not connected")]
    NotConnected,

    /// Connection attempt timed out
    #[error("Connection timeout - backend not available after {timeout_ms}ms")]
    ConnectionTimeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Backend answered with a non-success status
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or a generic `HTTP <code>` description.
        message: String,
    },

    /// The request could not be sent or its body could not be read
    #[error("Request failed: {reason}")]
    Request {
        /// The reason the request failed.
        reason: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {reason}")]
    InvalidResponse {
        /// What was wrong with the response.
        reason: String,
    },

    /// WebSocket error
    #[error("WebSocket error: {reason}")]
    WebSocketError {
        /// The reason for the WebSocket error.
        reason: String,
    },
}

impl ConnectionError {
    /// Build an HTTP error, preferring the server's own message.
    pub fn http(status: u16, reason: Option<&str>, server_message: Option<String>) -> Self {
        let message = server_message.unwrap_or_else(|| match reason {
            Some(reason) => format!("HTTP {}: {}", status, reason),
            None => format!("HTTP {}", status),
        });
        ConnectionError::Http { status, message }
    }
}

/// Upload validation error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Image mime type not in the allow-list
    #[error("Invalid image type. Please upload JPEG, PNG, or WebP files.")]
    InvalidImageType,

    /// Video mime type not in the allow-list
    #[error("Invalid video type. Please upload MP4, WebM, or QuickTime files.")]
    InvalidVideoType,

    /// File exceeds the configured maximum
    #[error("File too large. Maximum size is {max_mb}MB.")]
    FileTooLarge {
        /// The maximum size in megabytes.
        max_mb: u64,
    },

    /// Neither an image nor a video
    #[error("Unsupported file type: {mime_type}")]
    UnsupportedType {
        /// The rejected mime type.
        mime_type: String,
    },
}

/// Main error type for depressoAssist
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Upload error
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError::ConnectionTimeout { .. })
        )
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is an upload validation error
    pub fn is_upload_error(&self) -> bool {
        matches!(self, Error::Upload(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

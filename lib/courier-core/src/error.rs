//! Error types for courier.

use derive_more::{Display, Error, From};

// ============================================================================
// Transport Failure
// ============================================================================

/// Network-layer failure reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TransportFailure {
    /// Could not connect to the remote host.
    #[display("connection failed: {_0}")]
    Connect(#[error(not(source))] String),

    /// TLS handshake or certificate failure.
    #[display("TLS failure: {_0}")]
    Tls(#[error(not(source))] String),

    /// The request did not complete in time.
    #[display("request timed out")]
    Timeout,

    /// The call was cancelled before completion.
    #[display("request cancelled")]
    Cancelled,

    /// Any other I/O failure while sending or receiving.
    #[display("I/O failure: {_0}")]
    Io(#[error(not(source))] String),
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for courier operations.
///
/// Every public call either succeeds with a typed value or fails with exactly
/// one of these kinds. Decoding failures are kept apart from transport
/// failures so callers can branch on the cause.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The request could not be constructed (e.g. the URL is invalid).
    #[display("malformed request: {_0}")]
    #[from(skip)]
    MalformedRequest(#[error(not(source))] String),

    /// The server answered with a non-2xx status.
    #[display("HTTP error {code}")]
    #[from(skip)]
    HttpStatus {
        /// HTTP status code.
        code: u16,
        /// Response body decoded as JSON, when it was valid JSON.
        #[error(not(source))]
        payload: Option<serde_json::Value>,
    },

    /// The transport failed before a response was received.
    #[display("transport failure: {_0}")]
    #[from]
    Transport(TransportFailure),

    /// JSON decoding or keypath resolution failed.
    #[display("parsing failed at '{path}': {message}")]
    #[from(skip)]
    ParsingFailed {
        /// Keypath or JSON path where parsing failed (empty for the root).
        path: String,
        /// Error message.
        message: String,
    },

    /// A JSON resource could not be found.
    #[display("resource not found: {_0}")]
    #[from(skip)]
    ResourceNotFound(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a malformed request error.
    #[must_use]
    pub fn malformed_request(message: impl Into<String>) -> Self {
        Self::MalformedRequest(message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub const fn http_status(code: u16, payload: Option<serde_json::Value>) -> Self {
        Self::HttpStatus { code, payload }
    }

    /// Create a parsing error with path context.
    #[must_use]
    pub fn parsing_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParsingFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a resource-not-found error.
    #[must_use]
    pub fn resource_not_found(name: impl Into<String>) -> Self {
        Self::ResourceNotFound(name.into())
    }

    /// Returns the HTTP status code if this is an HTTP status error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the JSON payload attached to an HTTP status error.
    #[must_use]
    pub const fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::HttpStatus {
                payload: Some(payload),
                ..
            } => Some(payload),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if the transport timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportFailure::Timeout))
    }

    /// Returns `true` if the call was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportFailure::Cancelled))
    }

    /// Returns `true` if the transport could not connect.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Transport(TransportFailure::Connect(_)))
    }

    /// Returns `true` if this is a parsing error.
    #[must_use]
    pub const fn is_parsing(&self) -> bool {
        matches!(self, Self::ParsingFailed { .. })
    }
}

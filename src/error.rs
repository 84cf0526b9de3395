use serde_json::{Value as JsonValue, json};

/// Errors surfaced by the client.
///
/// Storage failures never appear here: they are logged and degraded at the
/// storage boundary (see [`StorageError`]).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Local, pre-network validation failure.
    #[error("Validation error: {0}")]
    Validation(String),
    /// The server (or the transport) rejected the request.
    #[error("{0}")]
    Response(ErrorResponse),
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
    /// A successful payload did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl Error {
    /// HTTP status of a rejected response, if the server answered at all.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response(response) => response.status,
            _ => None,
        }
    }

    /// The rejected response, if this error carries one.
    #[must_use]
    pub fn response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Response(response) => Some(response),
            _ => None,
        }
    }
}

/// A rejected response as seen by callers.
///
/// `status` is `None` for transport failures (connection refused, timeout),
/// in which case `body` holds `{"message": "<transport error>"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: Option<u16>,
    pub body: JsonValue,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(status: u16, body: JsonValue) -> Self {
        Self {
            status: Some(status),
            body,
        }
    }

    /// A response that never arrived.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: json!({ "message": message.into() }),
        }
    }

    /// Server-provided `message` field, when the body has one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(JsonValue::as_str)
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.message()) {
            (Some(status), Some(message)) => write!(f, "HTTP {status}: {message}"),
            (Some(status), None) => write!(f, "HTTP {status}"),
            (None, Some(message)) => write!(f, "No response: {message}"),
            (None, None) => f.write_str("No response"),
        }
    }
}

impl From<ErrorResponse> for Error {
    fn from(response: ErrorResponse) -> Self {
        Self::Response(response)
    }
}

/// Durable storage failures.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage format error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Storage exists but refuses access (disabled, quota, security policy).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

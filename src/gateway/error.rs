//! Errors returned by the remote gateway.

use std::fmt;

/// What: Failure of a single remote call.
///
/// Details:
/// - `RemoteUnavailable` covers transport failures (connect, timeout, TLS).
/// - `RemoteRejected` is an error response; `reason` carries the server's
///   `{"reason": ...}` text when present.
/// - `Decode` is a response body that did not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Transport failure.
    RemoteUnavailable(String),
    /// Server answered with an error payload.
    RemoteRejected {
        /// HTTP status code of the response.
        status: u16,
        /// Reason string reported by the server.
        reason: String,
    },
    /// Response body could not be decoded.
    Decode(String),
}

impl GatewayError {
    /// What: Text suitable for a user-facing notification.
    ///
    /// Output:
    /// - The server's reason for rejections, the transport message otherwise.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::RemoteUnavailable(msg) | Self::Decode(msg) => msg,
            Self::RemoteRejected { reason, .. } => reason,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteUnavailable(msg) => write!(f, "remote unavailable: {msg}"),
            Self::RemoteRejected { status, reason } => {
                write!(f, "remote rejected request ({status}): {reason}")
            }
            Self::Decode(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::RemoteUnavailable(value.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

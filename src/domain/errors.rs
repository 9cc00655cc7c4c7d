//! Domain errors for resource fetching.

use thiserror::Error;

/// Failure of a single fetch operation.
///
/// Errors are cloned to every subscriber attached to the failing operation,
/// so variants carry rendered messages rather than source errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network unreachable, connection reset, timeout, or a non-success status.
    #[error("{message}")]
    Transport {
        /// HTTP status when the transport produced one.
        status: Option<u16>,
        /// Human readable description.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The operation was cancelled before it settled.
    ///
    /// Never surfaced to subscribers as an error.
    #[error("Request aborted")]
    Aborted,
}

/// Result alias used by fetchers.
pub type FetchResult<T> = Result<T, FetchError>;

impl FetchError {
    /// Transport failure without a status code.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Transport failure for a non-success HTTP status.
    pub fn status(code: u16) -> Self {
        Self::Transport {
            status: Some(code),
            message: format!("Network response was not ok: {code}"),
        }
    }

    /// Body decoding failure.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Returns true if this failure came from cancellation.
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// HTTP status code, if the failure carried one.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Short machine-readable kind, used in logs and JSON output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Aborted => "aborted",
        }
    }
}

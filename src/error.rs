//! Failure taxonomy for the telemetry recorder.

use thiserror::Error;

/// Failure kinds an invocation can end with.
///
/// Every variant is caught at the binary boundary, logged, and surfaced to
/// the user once as a warning; nothing propagates to the host and run state
/// is never partially updated.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// No GitHub credential could be obtained.
    #[error("GitHub authentication session not available: {0}")]
    AuthenticationUnavailable(String),

    /// The account-status fetch failed, either in transport or with a
    /// non-success HTTP status.
    #[error("account status request failed: {message}")]
    RemoteRequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// Directory creation, rotation, append, or state persistence failed.
    #[error("{0}")]
    FileSystemError(String),
}

impl RecorderError {
    /// Wraps a transport-level fetch failure (no HTTP status available).
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteRequestFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Wraps a non-success HTTP response.
    pub fn remote_status(status: u16, status_text: &str) -> Self {
        Self::RemoteRequestFailed {
            status: Some(status),
            message: format!("GitHub API returned {}: {}", status, status_text),
        }
    }

    /// Converts a contextual filesystem error chain into the taxonomy.
    pub fn filesystem(err: anyhow::Error) -> Self {
        Self::FileSystemError(format!("{:#}", err))
    }
}

//! Error types for NoteVault client operations.
//!
//! Every public operation in the core resolves to a `Result` with one of
//! these variants. Errors are descriptive at the core level; the CLI layer
//! maps them to a single user-facing message and an exit code.

use thiserror::Error;

/// Result type alias for NoteVault operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Core error type for NoteVault operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The server answered with an unauthorized status. The session has
    /// already been torn down by the time the caller sees this.
    #[error("Session expired, please log in again")]
    AuthExpired,

    /// A protected operation was requested without a credential.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The server declined the request (malformed input, duplicate email, ...)
    #[error("{0}")]
    Rejected(String),

    /// The server has no such resource (404).
    #[error("{0}")]
    NotFound(String),

    /// Network, timeout or server-side failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The result was superseded by a newer request or a session change.
    #[error("Result superseded by a newer request")]
    Stale,

    /// Credential slot could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Whether the caller should show a notification for this error.
    ///
    /// Stale results are dropped silently.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, ClientError::Stale)
    }

    /// Whether this error means the user has to authenticate again.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::AuthExpired | ClientError::NotAuthenticated)
    }

    /// One human-readable line for the user.
    ///
    /// Transport failures get a generic message; the detail is logged.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => {
                "Could not reach the notes service, please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Transport(format!("Invalid response body: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_is_not_reportable() {
        assert!(!ClientError::Stale.is_reportable());
        assert!(ClientError::AuthExpired.is_reportable());
        assert!(ClientError::Rejected("bad".into()).is_reportable());
    }

    #[test]
    fn test_transport_message_is_generic() {
        let err = ClientError::Transport("connection refused (os error 111)".into());
        assert!(!err.user_message().contains("os error"));
    }

    #[test]
    fn test_rejected_message_passes_through() {
        let err = ClientError::Rejected("Title is required".into());
        assert_eq!(err.user_message(), "Title is required");
    }

    #[test]
    fn test_not_found_is_reportable_and_not_a_login_problem() {
        let err = ClientError::NotFound("Note not found".into());
        assert!(err.is_reportable());
        assert!(!err.requires_login());
        assert_eq!(err.user_message(), "Note not found");
    }

    #[test]
    fn test_requires_login() {
        assert!(ClientError::AuthExpired.requires_login());
        assert!(ClientError::NotAuthenticated.requires_login());
        assert!(!ClientError::Transport("x".into()).requires_login());
    }
}

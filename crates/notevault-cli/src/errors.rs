//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes so every command fails the same
//! way. Core `ClientError`s are translated here, once.

use std::fmt;

use notevault_core::ClientError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (note, config)
    NotFound { message: String, hint: String },

    /// Not logged in or session expired
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Input rejected locally or by the server
    InvalidInput(String),

    /// Network or storage failure
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, .. } => write!(f, "{}", message),
            CliError::AuthFailed { message, .. } => write!(f, "{}", message),
            CliError::InvalidInput(message) | CliError::General(message) => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Translate a core error into its user-facing form.
    ///
    /// Returns `None` for stale results, which are never shown.
    pub fn from_client(err: &ClientError) -> Option<Self> {
        if !err.is_reportable() {
            return None;
        }
        let message = err.user_message();
        Some(match err {
            ClientError::AuthExpired | ClientError::NotAuthenticated => {
                CliError::auth_failed_with_hint(message, "Run `notevault login` to sign in.")
            }
            ClientError::NotFound(_) => {
                CliError::not_found(message, "Run `notevault list` to find note IDs.")
            }
            ClientError::Rejected(_) => CliError::InvalidInput(message),
            ClientError::Transport(_) | ClientError::Storage(_) | ClientError::Stale => {
                CliError::General(message)
            }
        })
    }

    /// Hint shown under the message, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            CliError::NotFound { hint, .. } => Some(hint),
            CliError::AuthFailed { hint, .. } => hint.as_deref(),
            CliError::InvalidInput(_) | CliError::General(_) => None,
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::General(_) => exit_codes::GENERAL,
        }
    }
}

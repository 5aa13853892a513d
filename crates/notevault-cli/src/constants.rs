//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (network, storage, anything unclassified)
/// - 2: Misuse of shell command (reserved by shells, used by clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Note or other resource not found.
    pub const NOT_FOUND: i32 = 3;

    /// Input rejected locally or by the server.
    pub const INVALID_INPUT: i32 = 4;

    /// Not logged in, or the session expired.
    pub const AUTH_FAILED: i32 = 5;

    /// Anything else.
    pub const GENERAL: i32 = 1;
}

/// Default log filter when `NOTEVAULT_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "NOTEVAULT_LOG";

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "NOTEVAULT_CONFIG";

//! # NoteVault Core
//!
//! Client library for the NoteVault notes service: authenticated requests,
//! session lifecycle, and a local notes collection kept consistent with the
//! server.
//!
//! This crate has no terminal or UI concerns; the CLI builds on top of it.
//!
//! ## Architecture
//!
//! - **session**: credential store, persistence slot, teardown, login/logout
//! - **gateway**: bearer injection and unauthorized-response handling around
//!   a pluggable `Transport`
//! - **notes**: CRUD against the service and the reconciled local cache
//! - **search**: debounced queries with stale-result rejection
//! - **client**: `NotesClient`, which wires the pieces together

pub mod client;
pub mod config;
pub mod error;
pub mod fs;
pub mod gateway;
pub mod models;
pub mod notes;
pub mod search;
pub mod session;

pub use client::NotesClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use models::{Note, NoteDraft, Session, User};
pub use search::{PendingQuery, SearchCoordinator, SearchEvent};
pub use session::{AuthOutcome, AuthState};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

//! Application-level utilities for the NoteVault CLI.
//!
//! - Path resolution for config and session files
//! - The per-invocation `AppContext`
//! - Password prompting

mod context;
mod password;
mod resolver;

pub use context::AppContext;
pub use password::resolve_password;
pub use resolver::{resolve_config_path, resolve_session_path};

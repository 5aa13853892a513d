//! UI primitives for the NoteVault CLI.
//!
//! - **Context**: environment detection (TTY, width, color, unicode)
//! - **Mode**: output mode resolution (json, plain, pretty)
//! - **Theme**: badges, styles, symbols
//! - **Render**: tables, headers, receipts, hints
//! - **Format**: string utilities (truncate, wrap, dates)

mod context;
pub mod format;
mod mode;
pub mod render;
pub mod theme;

pub use context::{DisplayFlags, UiContext};
pub use theme::Badge;

pub use render::{
    badge, blank_line, divider, header, hint, kv, print, print_error, receipt, simple_table,
    Column,
};

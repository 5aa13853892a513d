//! Output formatting helpers for the CLI.
//!
//! Notes are printed as JSON, a table, or plain tab-separated rows.

mod json;
mod text;

pub use json::{note_json, notes_json, user_json};
pub use text::{print_note, print_note_list};

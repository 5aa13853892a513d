//! Text and table output formatting for notes.

use notevault_core::models::format_tags;
use notevault_core::Note;

use crate::ui::format::{format_datetime, preview, truncate, wrap};
use crate::ui::theme::{styled, styles, PINNED};
use crate::ui::{kv, simple_table, Column, UiContext};

const TITLE_WIDTH: usize = 40;
const PREVIEW_WIDTH: usize = 48;

fn note_row(ctx: &UiContext, note: &Note) -> Vec<String> {
    let pretty = ctx.mode.is_pretty();
    let mut title = truncate(&note.title, TITLE_WIDTH);
    if note.is_pinned {
        title = format!("{} {}", PINNED.get(ctx.unicode), title);
    }
    let updated = if pretty {
        note.updated_at.format("%Y-%m-%d").to_string()
    } else {
        format_datetime(&note.updated_at, false)
    };
    let mut row = vec![note.id.clone(), updated, title, format_tags(&note.tags)];
    if pretty {
        row.push(preview(&note.content, PREVIEW_WIDTH));
    }
    row
}

/// Print a list of notes as a table (pretty) or tab-separated rows (plain).
pub fn print_note_list(ctx: &UiContext, notes: &[Note]) {
    if notes.is_empty() {
        if ctx.mode.is_pretty() {
            println!("{}", styled("No notes.", styles::dim(), ctx.color));
        }
        return;
    }
    let columns = [
        Column::new("ID"),
        Column::new("Updated"),
        Column::new("Title"),
        Column::new("Tags"),
        Column::new("Preview"),
    ];
    let columns = if ctx.mode.is_pretty() {
        &columns[..]
    } else {
        &columns[..4]
    };
    let rows: Vec<Vec<String>> = notes.iter().map(|note| note_row(ctx, note)).collect();
    println!("{}", simple_table(ctx, columns, &rows));
}

/// Print a single note in human-readable form.
pub fn print_note(ctx: &UiContext, note: &Note, quiet: bool) {
    let pretty = ctx.mode.is_pretty();
    if !quiet {
        if pretty {
            println!("{}", styled(&note.title, styles::bold(), ctx.color));
        } else {
            println!("{}", kv(ctx, "Title", &note.title));
        }
        println!("{}", kv(ctx, "ID", &note.id));
        if let Some(created) = &note.created_at {
            println!("{}", kv(ctx, "Created", &format_datetime(created, pretty)));
        }
        println!(
            "{}",
            kv(ctx, "Updated", &format_datetime(&note.updated_at, pretty))
        );
        if !note.tags.is_empty() {
            println!("{}", kv(ctx, "Tags", &format_tags(&note.tags)));
        }
        if note.is_pinned {
            println!("{}", kv(ctx, "Pinned", "yes"));
        }
        println!();
    }
    if pretty {
        for line in wrap(&note.content, ctx.width.saturating_sub(2).max(20)) {
            println!("{}", line);
        }
    } else {
        println!("{}", note.content);
    }
}

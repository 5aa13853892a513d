use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use notevault_core::{SearchCoordinator, SearchEvent};

use crate::app::AppContext;
use crate::cli::SearchArgs;
use crate::errors::CliError;
use crate::output::{notes_json, print_note_list};
use crate::ui::theme::SEARCH_PROMPT;
use crate::ui::{blank_line, divider, header, hint, print, print_error, UiContext};

/// Interactive search: every line read from stdin replaces the query.
///
/// Lines typed faster than the debounce window collapse into one request,
/// and results that arrive out of order are dropped, so only the latest
/// query's results are ever printed last.
pub async fn handle_search(ctx: &AppContext<'_>, args: &SearchArgs) -> anyhow::Result<()> {
    // A long-running view: confirm the session before reading input.
    let client = ctx.verified_client().await?;
    let ui = ctx.ui_context(args.json);
    let (search, mut events) = client.search();
    // Enough for the final request to land after stdin closes.
    let drain_timeout = client.config().timeout + client.config().debounce;

    if !ctx.quiet() && ui.mode.is_pretty() {
        print(&ui, &header(&ui, "search", None));
        print(
            &ui,
            &hint(&ui, "type a query per line, an empty line lists everything, Ctrl-D ends"),
        );
        blank_line(&ui);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_seq = None;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => last_seq = Some(search.on_query_changed(line.trim())),
                    None => break,
                }
            }
            Some(event) = events.recv() => {
                show_event(ctx, &ui, &event)?;
            }
        }
    }

    finish(ctx, &ui, &search, &mut events, last_seq, drain_timeout).await
}

/// Fire whatever is still pending and wait for the last query's outcome.
async fn finish(
    ctx: &AppContext<'_>,
    ui: &UiContext,
    search: &SearchCoordinator,
    events: &mut UnboundedReceiver<SearchEvent>,
    last_seq: Option<u64>,
    drain_timeout: Duration,
) -> anyhow::Result<()> {
    let Some(last_seq) = last_seq else {
        return Ok(());
    };
    if let Some(handle) = search.flush() {
        // The request reports through the event channel.
        let _ = handle.await;
    }
    while let Ok(Some(event)) = tokio::time::timeout(drain_timeout, events.recv()).await {
        show_event(ctx, ui, &event)?;
        if event.seq() >= last_seq {
            break;
        }
    }
    Ok(())
}

fn show_event(ctx: &AppContext<'_>, ui: &UiContext, event: &SearchEvent) -> anyhow::Result<()> {
    match event {
        SearchEvent::Applied { query, notes, .. } => {
            if ui.mode.is_json() {
                let line = serde_json::json!({ "query": query, "notes": notes_json(notes) });
                println!("{}", serde_json::to_string(&line)?);
                return Ok(());
            }
            if !ctx.quiet() {
                let label = if query.is_empty() {
                    "(all notes)".to_string()
                } else {
                    query.clone()
                };
                print(
                    ui,
                    &format!("{} {} ({})", SEARCH_PROMPT.get(ui.unicode), label, notes.len()),
                );
            }
            print_note_list(ui, notes);
            if ui.mode.is_pretty() {
                print(ui, &divider(ui));
            }
            Ok(())
        }
        SearchEvent::Failed { error, .. } => {
            // A dead session ends the whole search.
            if error.requires_login() {
                return Err(error.clone().into());
            }
            if let Some(cli_err) = CliError::from_client(error) {
                print_error(ui, &cli_err.to_string(), cli_err.hint());
            }
            Ok(())
        }
    }
}

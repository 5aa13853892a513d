use dialoguer::Confirm;

use notevault_core::NoteDraft;

use crate::app::AppContext;
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::errors::CliError;
use crate::output::{note_json, notes_json, print_note, print_note_list};
use crate::ui::{badge, blank_line, header, hint, print, receipt, Badge};

pub async fn handle_list(ctx: &AppContext<'_>, args: &ListArgs) -> anyhow::Result<()> {
    let client = ctx.signed_in_client()?;
    let search = args.search.as_deref().unwrap_or("").trim();
    let notes = client.notes().list(search).await?;

    let ui = ctx.ui_context(args.json);
    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&notes_json(&notes))?);
        return Ok(());
    }
    if !ctx.quiet() && ui.mode.is_pretty() {
        let context = (!search.is_empty()).then_some(search);
        print(&ui, &header(&ui, "list", context));
        blank_line(&ui);
    }
    print_note_list(&ui, &notes);
    if !ctx.quiet() && ui.mode.is_pretty() && !notes.is_empty() {
        blank_line(&ui);
        print(&ui, &hint(&ui, "notevault show <id>"));
    }
    Ok(())
}

pub async fn handle_show(ctx: &AppContext<'_>, args: &ShowArgs) -> anyhow::Result<()> {
    let client = ctx.signed_in_client()?;
    let note = client.notes().get(&args.id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&note_json(&note))?);
    } else {
        print_note(&ctx.ui_context(false), &note, ctx.quiet());
    }
    Ok(())
}

pub async fn handle_add(ctx: &AppContext<'_>, args: &AddArgs) -> anyhow::Result<()> {
    let client = ctx.signed_in_client()?;
    let mut draft = NoteDraft::new(&args.title, &args.content);
    if let Some(tags) = &args.tags {
        draft = draft.with_tag_input(tags);
    }
    let note = client.notes().create(&draft).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&note_json(&note))?);
    } else if ctx.quiet() {
        println!("{}", note.id);
    } else {
        let ui = ctx.ui_context(false);
        let items = [("ID", note.id.as_str()), ("Title", note.title.as_str())];
        print(&ui, &receipt(&ui, "Created note", &items));
    }
    Ok(())
}

pub async fn handle_edit(ctx: &AppContext<'_>, args: &EditArgs) -> anyhow::Result<()> {
    if args.title.is_none() && args.content.is_none() && args.tags.is_none() {
        return Err(CliError::invalid_input(
            "Nothing to change. Pass --title, --content or --tags.",
        )
        .into());
    }
    let client = ctx.signed_in_client()?;

    // Unchanged fields keep the server's current values.
    let current = client.notes().get(&args.id).await?;
    let mut draft = NoteDraft::from_note(&current);
    if let Some(title) = &args.title {
        draft.title = title.clone();
    }
    if let Some(content) = &args.content {
        draft.content = content.clone();
    }
    if let Some(tags) = &args.tags {
        draft = draft.with_tag_input(tags);
    }
    let note = client.notes().update(&args.id, &draft).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&note_json(&note))?);
    } else if !ctx.quiet() {
        let ui = ctx.ui_context(false);
        let items = [("ID", note.id.as_str()), ("Title", note.title.as_str())];
        print(&ui, &receipt(&ui, "Updated note", &items));
    }
    Ok(())
}

pub async fn handle_delete(ctx: &AppContext<'_>, args: &DeleteArgs) -> anyhow::Result<()> {
    let client = ctx.signed_in_client()?;
    let ui = ctx.ui_context(false);

    if !args.yes {
        if !ui.is_interactive() {
            return Err(CliError::invalid_input(
                "Refusing to delete without confirmation. Pass --yes.",
            )
            .into());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete note {}?", args.id))
            .default(false)
            .interact()?;
        if !confirmed {
            if !ctx.quiet() {
                print(&ui, &badge(&ui, Badge::Info, "Cancelled"));
            }
            return Ok(());
        }
    }

    client.notes().delete(&args.id).await?;

    if !ctx.quiet() {
        print(&ui, &receipt(&ui, "Deleted note", &[("ID", args.id.as_str())]));
    }
    Ok(())
}

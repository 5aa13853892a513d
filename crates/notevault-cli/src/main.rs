//! NoteVault CLI - your notes, from the terminal
//!
//! The command-line surface over `notevault-core`: sign in, then list,
//! search and edit notes stored on a NoteVault server.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod output;
mod ui;

use clap::Parser;
use notevault_core::{ClientError, VERSION};

use crate::app::AppContext;
use crate::cli::{Cli, Commands, ConfigSubcommand};
use crate::commands::{auth, config as config_cmd, misc, notes, search};
use crate::constants::{exit_codes, DEFAULT_LOG_FILTER, LOG_ENV};
use crate::errors::CliError;
use crate::ui::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli).await {
        let code = report_error(&ctx, &e);
        std::process::exit(code);
    }
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, DEFAULT_LOG_FILTER));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

/// Print one line (plus optional hint) for a failure and pick the exit code.
fn report_error(ctx: &AppContext<'_>, err: &anyhow::Error) -> i32 {
    let ui = ctx.ui_context(false);

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        print_error(&ui, &cli_err.to_string(), cli_err.hint());
        return cli_err.exit_code();
    }
    if let Some(client_err) = err.downcast_ref::<ClientError>() {
        log::debug!("command failed: {:?}", client_err);
        return match CliError::from_client(client_err) {
            Some(cli_err) => {
                print_error(&ui, &cli_err.to_string(), cli_err.hint());
                cli_err.exit_code()
            }
            None => exit_codes::GENERAL,
        };
    }

    print_error(&ui, &format!("{:#}", err), None);
    exit_codes::GENERAL
}

async fn run(ctx: &AppContext<'_>, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Register(args)) => auth::handle_register(ctx, args).await?,
        Some(Commands::Login(args)) => auth::handle_login(ctx, args).await?,
        Some(Commands::Logout) => auth::handle_logout(ctx)?,
        Some(Commands::Whoami(args)) => auth::handle_whoami(ctx, args).await?,
        Some(Commands::List(args)) => notes::handle_list(ctx, args).await?,
        Some(Commands::Show(args)) => notes::handle_show(ctx, args).await?,
        Some(Commands::Add(args)) => notes::handle_add(ctx, args).await?,
        Some(Commands::Edit(args)) => notes::handle_edit(ctx, args).await?,
        Some(Commands::Delete(args)) => notes::handle_delete(ctx, args).await?,
        Some(Commands::Search(args)) => search::handle_search(ctx, args).await?,
        Some(Commands::Config(args)) => match &args.command {
            ConfigSubcommand::Init(init_args) => config_cmd::handle_init(ctx, init_args)?,
            ConfigSubcommand::Show => config_cmd::handle_show(ctx)?,
        },
        Some(Commands::Completions(args)) => misc::handle_completions(args)?,
        None => {
            println!("NoteVault v{}", VERSION);
            println!("\nQuickstart:");
            println!("  notevault register --name Ada --email ada@example.com");
            println!("  notevault add --title \"Groceries\" --content \"milk\" --tags home");
            println!("  notevault list --search groc");
            println!("  notevault search");
            println!("\nRun `notevault --help` for full usage.");
        }
    }

    Ok(())
}

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use notevault_core::VERSION;

/// NoteVault - your notes, from the terminal
#[derive(Parser)]
#[command(name = "notevault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the notes API (overrides config)
    #[arg(long, global = true, env = "NOTEVAULT_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log requests and session changes to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,
}

/// Arguments for the `register` command
#[derive(Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "NOTEVAULT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the `login` command
#[derive(Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "NOTEVAULT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the `whoami` command
#[derive(Args)]
pub struct WhoamiArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Only notes whose title or content matches
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Note title
    #[arg(long)]
    pub title: String,

    /// Note body
    #[arg(long, default_value = "")]
    pub content: String,

    /// Comma-separated tags (e.g. "work, ideas")
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New body
    #[arg(long)]
    pub content: Option<String>,

    /// New comma-separated tags ("" clears them)
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `search` command
#[derive(Args)]
pub struct SearchArgs {
    /// Output each applied result set as a JSON line
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `config init` command
#[derive(Args)]
pub struct ConfigInitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Write a config file with default settings
    Init(ConfigInitArgs),

    /// Print the effective settings
    Show,
}

/// Arguments for the `config` command group
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and sign in
    Register(RegisterArgs),

    /// Sign in with an existing account
    Login(LoginArgs),

    /// Sign out and forget the saved session
    Logout,

    /// Show the signed-in user
    Whoami(WhoamiArgs),

    /// List notes, newest first
    List(ListArgs),

    /// Show a note by ID
    Show(ShowArgs),

    /// Create a note
    Add(AddArgs),

    /// Change a note's title, content or tags
    Edit(EditArgs),

    /// Delete a note
    Delete(DeleteArgs),

    /// Search interactively: each line on stdin refines the query
    Search(SearchArgs),

    /// Manage the config file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

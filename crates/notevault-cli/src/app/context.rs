//! Application context for the NoteVault CLI.
//!
//! Bundles CLI arguments with the lazily-loaded config file and the
//! client built from it.

use once_cell::unsync::OnceCell;

use notevault_core::session::FileSlot;
use notevault_core::{AuthState, NotesClient};

use crate::cli::Cli;
use crate::config::NotevaultConfig;
use crate::errors::CliError;
use crate::ui::{DisplayFlags, UiContext};

use super::resolver::{load_config, resolve_session_path};

/// Application context shared by every command handler.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<NotevaultConfig>,
    client: OnceCell<NotesClient>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            client: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the config file contents (defaults when there is no file).
    pub fn config(&self) -> anyhow::Result<&NotevaultConfig> {
        self.config.get_or_try_init(load_config)
    }

    /// UI context for a command's output.
    pub fn ui_context(&self, json: bool) -> UiContext {
        UiContext::from_env(DisplayFlags {
            json,
            no_color: self.cli.no_color,
            ascii: self.cli.ascii,
        })
    }

    /// The notes client, with the saved session (if any) loaded.
    pub fn client(&self) -> anyhow::Result<&NotesClient> {
        self.client.get_or_try_init(|| {
            let config = self.config()?.client_config(self.cli.api_url.as_deref());
            log::debug!("using API at {}", config.base_url);
            let slot = FileSlot::new(resolve_session_path()?);
            let client = NotesClient::new(config, slot)?;
            client.session().restore()?;
            Ok(client)
        })
    }

    /// The notes client, failing early when nobody is signed in.
    ///
    /// The saved session is trusted until the server says otherwise.
    pub fn signed_in_client(&self) -> anyhow::Result<&NotesClient> {
        let client = self.client()?;
        if !client.credentials().is_authenticated() {
            return Err(not_logged_in().into());
        }
        Ok(client)
    }

    /// The notes client, with the saved session confirmed by the server.
    ///
    /// Used before showing who is signed in. A session the server does not
    /// confirm is signed out here.
    pub async fn verified_client(&self) -> anyhow::Result<&NotesClient> {
        let client = self.client()?;
        let had_session = client.credentials().is_authenticated();
        match client.session().bootstrap().await {
            AuthState::Authenticated(_) => Ok(client),
            _ if had_session => Err(CliError::auth_failed_with_hint(
                "Saved session is no longer valid",
                "Run `notevault login` to sign in again.",
            )
            .into()),
            _ => Err(not_logged_in().into()),
        }
    }
}

fn not_logged_in() -> CliError {
    CliError::auth_failed_with_hint("Not logged in", "Run `notevault login` to sign in.")
}

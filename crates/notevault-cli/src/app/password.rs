//! Password input for `login` and `register`.

use std::io::IsTerminal;

use dialoguer::Password;

use crate::errors::CliError;

/// Use the password given on the command line (or `NOTEVAULT_PASSWORD`),
/// otherwise prompt for it.
///
/// `confirm` asks twice, for new accounts.
pub fn resolve_password(given: Option<&str>, confirm: bool) -> anyhow::Result<String> {
    if let Some(value) = given.filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::invalid_input(
            "No password provided and no TTY available. Use --password or set NOTEVAULT_PASSWORD.",
        )
        .into());
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

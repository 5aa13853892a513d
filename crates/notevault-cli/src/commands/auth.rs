use notevault_core::{AuthOutcome, ClientError};

use crate::app::{resolve_password, AppContext};
use crate::cli::{LoginArgs, RegisterArgs, WhoamiArgs};
use crate::errors::CliError;
use crate::output::user_json;
use crate::ui::{kv, print, receipt};

pub async fn handle_register(ctx: &AppContext<'_>, args: &RegisterArgs) -> anyhow::Result<()> {
    let password = resolve_password(args.password.as_deref(), true)?;
    let client = ctx.client()?;

    match client
        .session()
        .register(&args.name, &args.email, &password)
        .await
    {
        AuthOutcome::Success(session) => {
            if !ctx.quiet() {
                let ui = ctx.ui_context(false);
                let items = [
                    ("Name", session.user.name.as_str()),
                    ("Email", session.user.email.as_str()),
                ];
                print(&ui, &receipt(&ui, "Account created, signed in", &items));
            }
            Ok(())
        }
        AuthOutcome::Failure(message) => Err(CliError::invalid_input(message).into()),
    }
}

pub async fn handle_login(ctx: &AppContext<'_>, args: &LoginArgs) -> anyhow::Result<()> {
    let password = resolve_password(args.password.as_deref(), false)?;
    let client = ctx.client()?;

    match client.session().login(&args.email, &password).await {
        AuthOutcome::Success(session) => {
            if !ctx.quiet() {
                let ui = ctx.ui_context(false);
                let items = [("User", session.display_name())];
                print(&ui, &receipt(&ui, "Signed in", &items));
            }
            Ok(())
        }
        AuthOutcome::Failure(message) => Err(CliError::auth_failed_with_hint(
            message,
            "Check your email and password, or run `notevault register`.",
        )
        .into()),
    }
}

pub fn handle_logout(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let was_signed_in = client.credentials().is_authenticated();
    client.session().logout();

    if !ctx.quiet() {
        let ui = ctx.ui_context(false);
        let title = if was_signed_in {
            "Signed out"
        } else {
            "Not signed in"
        };
        print(&ui, &receipt(&ui, title, &[]));
    }
    Ok(())
}

pub async fn handle_whoami(ctx: &AppContext<'_>, args: &WhoamiArgs) -> anyhow::Result<()> {
    let client = ctx.verified_client().await?;
    let session = client
        .session()
        .current_user()
        .ok_or(ClientError::NotAuthenticated)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&user_json(&session.user))?);
        return Ok(());
    }
    let ui = ctx.ui_context(false);
    if ctx.quiet() {
        println!("{}", session.user.email);
        return Ok(());
    }
    println!("{}", kv(&ui, "Name", &session.user.name));
    println!("{}", kv(&ui, "Email", &session.user.email));
    println!("{}", kv(&ui, "ID", &session.user.id));
    Ok(())
}

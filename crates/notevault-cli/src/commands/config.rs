use crate::app::{resolve_config_path, resolve_session_path, AppContext};
use crate::cli::ConfigInitArgs;
use crate::config::{write_config, NotevaultConfig};
use crate::errors::CliError;
use crate::ui::{kv, print, receipt};

pub fn handle_init(ctx: &AppContext<'_>, args: &ConfigInitArgs) -> anyhow::Result<()> {
    let path = resolve_config_path()?;
    if path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}. Pass --force to overwrite it.",
            path.display()
        ))
        .into());
    }

    let mut config = NotevaultConfig::default();
    if let Some(url) = ctx.cli().api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        config.server.base_url = url.trim_end_matches('/').to_string();
    }
    write_config(&path, &config)?;

    if !ctx.quiet() {
        let ui = ctx.ui_context(false);
        let path_text = path.display().to_string();
        let items = [
            ("Path", path_text.as_str()),
            ("API", config.server.base_url.as_str()),
        ];
        print(&ui, &receipt(&ui, "Wrote config", &items));
    }
    Ok(())
}

pub fn handle_show(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let path = resolve_config_path()?;
    let file = ctx.config()?;
    let effective = file.client_config(ctx.cli().api_url.as_deref());
    let session_path = resolve_session_path()?;

    let ui = ctx.ui_context(false);
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };
    println!("{}", kv(&ui, "Config", &source));
    println!("{}", kv(&ui, "API", &effective.base_url));
    println!(
        "{}",
        kv(&ui, "Timeout", &format!("{}s", effective.timeout.as_secs()))
    );
    println!(
        "{}",
        kv(
            &ui,
            "Debounce",
            &format!("{}ms", effective.debounce.as_millis())
        )
    );
    println!(
        "{}",
        kv(&ui, "Session", &session_path.display().to_string())
    );
    Ok(())
}

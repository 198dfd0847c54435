use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, connected, open_session};
use crate::auth::AuthMethod;
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::{LctxError, Result};
use crate::paths;

/// Connect interactively, replacing any restored session on success
pub async fn cmd_connect(method: Option<AuthMethod>) -> Result<()> {
    let config = Config::load()?;
    let mut manager = open_session(&config)?;
    manager.initialize().await;

    if !manager.connect_with(method).await {
        return Err(LctxError::Auth(
            "connection to Linear was not established".to_string(),
        ));
    }
    if let Ok(viewer) = manager.try_viewer().await {
        println!("Signed in as {} <{}>", viewer.name.cyan(), viewer.email);
    }
    Ok(())
}

/// Disconnect; `sign_out` also removes the stored OAuth token
pub async fn cmd_disconnect(sign_out: bool) -> Result<()> {
    let config = Config::load()?;
    let mut manager = open_session(&config)?;
    manager.initialize().await;

    if !manager.disconnect_with(sign_out).await {
        let mut stores = vec![paths::secrets_path()?.display().to_string()];
        if sign_out {
            stores.push(paths::oauth_token_path()?.display().to_string());
        }
        return Err(LctxError::Other(format!(
            "could not remove stored credentials from {}",
            stores.join(" or ")
        )));
    }
    Ok(())
}

/// Connection, account and context issue overview
pub async fn cmd_status(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let mut manager = open_session(&config)?;
    let connected = manager.initialize().await;

    let viewer = if connected {
        manager.viewer().await
    } else {
        None
    };
    let context_id = manager.context_issue_id().await;
    let context_issue = match context_id {
        Some(_) if connected => manager.context_issue().await,
        _ => None,
    };

    let json_output = json!({
        "connected": connected,
        "auth_method": manager.auth_method().map(|m| m.to_string()),
        "user": viewer,
        "context_issue_id": context_id,
        "context_issue": context_issue.as_ref().map(|i| &i.identifier),
        "config_file": paths::config_path()?.to_string_lossy(),
        "workspace_state": paths::workspace_state_path().to_string_lossy(),
    });

    let mut text = String::new();
    match (manager.auth_method(), &viewer) {
        (Some(method), Some(user)) => text.push_str(&format!(
            "{} as {} ({})\n",
            "Connected".green(),
            user.name.cyan(),
            method
        )),
        (Some(method), None) => text.push_str(&format!(
            "{} ({}), but the account could not be loaded\n",
            "Connected".yellow(),
            method
        )),
        _ => text.push_str(&format!(
            "{} (run `lctx connect`)\n",
            "Not connected".dimmed()
        )),
    }
    match (&context_id, &context_issue) {
        (_, Some(issue)) => text.push_str(&format!("Context issue: {}\n", issue)),
        (Some(id), None) => text.push_str(&format!("Context issue: {}\n", id.dimmed())),
        (None, None) => text.push_str(&format!("Context issue: {}\n", "none".dimmed())),
    }
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", paths::config_path()?.display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(output)
}

pub async fn cmd_whoami(output: OutputOptions) -> Result<()> {
    let manager = connected().await?;
    let user = manager.try_viewer().await?;

    let text = format!(
        "{} ({}) <{}>\n{}",
        user.name.bold(),
        user.display_name,
        user.email,
        user.id.dimmed()
    );
    CommandOutput::new(serde_json::to_value(&user)?)
        .with_text(text)
        .print(output)
}

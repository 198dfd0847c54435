//! CLI command handlers.
//!
//! Every handler opens a [`ContextManager`] wired to the real collaborators
//! (terminal prompter, token file, secrets file, workspace state file) and
//! reports failures through the `try_` operations so the user sees why.

mod browse;
mod config;
mod connect;
mod context;
mod create;
pub mod resolve;

pub use browse::{cmd_issues, cmd_members, cmd_priorities, cmd_show, cmd_states, cmd_teams};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use connect::{cmd_connect, cmd_disconnect, cmd_status, cmd_whoami};
pub use context::{cmd_comment, cmd_context_set, cmd_context_show, cmd_set_status};
pub use create::{CreateOptions, cmd_create};

use std::io::{self, BufRead};
use std::sync::Arc;

use serde_json::Value;

use crate::auth::TokenFileSessionProvider;
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::{LctxError, Result};
use crate::linear::HttpConnector;
use crate::paths;
use crate::prompt::{Prompter, TerminalPrompter};
use crate::session::{Collaborators, ContextManager};
use crate::storage::{EnvSecretStore, FileSecretStore, FileWorkspaceState};

pub type Manager = ContextManager<HttpConnector>;

/// Output of a command in both renderings; `--json` picks which one prints.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        if output.json {
            println!("{}", serde_json::to_string_pretty(&self.json)?);
        } else if let Some(text) = self.text {
            println!("{text}");
        }
        Ok(())
    }
}

/// Build a manager for the current workspace without restoring a session.
pub fn open_session(config: &Config) -> Result<Manager> {
    let prompter: Arc<dyn Prompter> = Arc::new(TerminalPrompter);
    let sessions = TokenFileSessionProvider::new(
        paths::oauth_token_path()?,
        config.oauth.clone(),
        prompter.clone(),
    );
    let secrets = EnvSecretStore::new(FileSecretStore::new(paths::secrets_path()?));
    let workspace = FileWorkspaceState::new(paths::workspace_state_path());

    let manager = ContextManager::new(
        HttpConnector::from_config(config),
        Collaborators {
            sessions: Arc::new(sessions),
            secrets: Arc::new(secrets),
            workspace: Arc::new(workspace),
            prompter,
        },
    )
    .with_scopes(config.oauth.scopes.clone())
    .with_page_size(config.page_size);
    Ok(manager)
}

/// Load config and restore a session, failing if there is none.
pub async fn connected() -> Result<Manager> {
    let config = Config::load()?;
    let mut manager = open_session(&config)?;
    if !manager.initialize().await {
        return Err(LctxError::NotAuthenticated);
    }
    Ok(manager)
}

/// Text from arguments, falling back to piped stdin.
fn text_or_stdin(args: &[String]) -> Result<String> {
    let text = args.join(" ");
    if !text.trim().is_empty() {
        return Ok(text);
    }
    if atty::is(atty::Stream::Stdin) {
        return Ok(String::new());
    }

    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        lines.push(line?);
    }
    Ok(lines.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_from_args_is_joined() {
        let args = vec!["looks".to_string(), "good".to_string()];
        assert_eq!(text_or_stdin(&args).unwrap(), "looks good");
    }

    #[test]
    fn test_command_output_keeps_both_renderings() {
        let output = CommandOutput::new(json!({"ok": true})).with_text("done");
        assert_eq!(output.json["ok"], true);
        assert_eq!(output.text.as_deref(), Some("done"));
    }
}

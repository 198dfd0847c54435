use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;

use crate::auth::AuthMethod;

#[derive(Parser)]
#[command(name = "lctx")]
#[command(about = "Linear issues and a per-workspace context issue")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format shared by read commands
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to Linear (OAuth or personal API key)
    Connect {
        /// Skip the method picker: oauth or api-key
        #[arg(long, value_parser = parse_auth_method)]
        method: Option<AuthMethod>,
    },

    /// Forget the stored API key and disconnect
    Disconnect {
        /// Also forget the stored OAuth session
        #[arg(long)]
        sign_out: bool,
    },

    /// Show connection and context issue status
    Status {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Show the authenticated Linear user
    Whoami {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List issues assigned to you
    #[command(visible_alias = "mine")]
    Issues {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List your teams
    Teams {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List workflow states
    States {
        /// Only states of this team (key, name or ID)
        #[arg(long)]
        team: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// List issue priority values
    Priorities {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List members of a team
    Members {
        /// Team key, name or ID
        team: String,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Show an issue by identifier (e.g. ENG-123)
    #[command(visible_alias = "s")]
    Show {
        /// Issue identifier
        identifier: String,

        /// Also make it the context issue
        #[arg(long)]
        set_context: bool,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Manage the context issue
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Comment on the context issue
    Comment {
        /// Comment text (reads from stdin if not provided)
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Move the context issue to a workflow state
    SetStatus {
        /// Workflow state name or ID
        state: String,
    },

    /// Create a new issue
    #[command(visible_alias = "c")]
    Create {
        /// Issue title
        title: String,

        /// Team key, name or ID
        #[arg(long)]
        team: String,

        /// Description (markdown)
        #[arg(short, long)]
        description: Option<String>,

        /// Assignee user ID, or "me"
        #[arg(short, long)]
        assignee: Option<String>,

        /// Initial workflow state name or ID
        #[arg(long)]
        state: Option<String>,

        /// Estimate in points
        #[arg(long)]
        estimate: Option<i32>,

        /// Priority (0 = none, 1 = urgent ... 4 = low)
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<i32>,

        /// Make the new issue the context issue
        #[arg(long)]
        set_context: bool,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ContextAction {
    /// Set the context issue (identifier or ID)
    Set {
        /// Issue identifier, e.g. ENG-123
        issue: String,
    },
    /// Show the context issue
    Show {
        /// Include assignee, creator, team, subscribers and comments
        #[arg(long)]
        details: bool,

        #[command(flatten)]
        output: OutputOptions,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        #[command(flatten)]
        output: OutputOptions,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, timeout, page_size, oauth.client_id, oauth.redirect_uri, oauth.scopes)
        key: String,
        /// Value to set
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
}

fn parse_auth_method(s: &str) -> Result<AuthMethod, String> {
    s.parse().map_err(|e: crate::error::LctxError| e.to_string())
}

fn parse_priority(s: &str) -> Result<i32, String> {
    match s.parse::<i32>() {
        Ok(p @ 0..=4) => Ok(p),
        _ => Err(format!("invalid priority '{s}', expected 0-4")),
    }
}

/// Write completions for `shell` to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "lctx", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse_priority("0"), Ok(0));
        assert_eq!(parse_priority("4"), Ok(4));
        assert!(parse_priority("5").is_err());
        assert!(parse_priority("high").is_err());
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "lctx", "create", "Fix bug", "--team", "ENG", "-p", "2", "--set-context",
        ])
        .unwrap();
        match cli.command {
            Commands::Create {
                title,
                team,
                priority,
                set_context,
                ..
            } => {
                assert_eq!(title, "Fix bug");
                assert_eq!(team, "ENG");
                assert_eq!(priority, Some(2));
                assert!(set_context);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_parse_connect_method() {
        let cli = Cli::try_parse_from(["lctx", "connect", "--method", "api-key"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Connect {
                method: Some(AuthMethod::ApiKey)
            }
        ));
        assert!(Cli::try_parse_from(["lctx", "connect", "--method", "sso"]).is_err());
    }
}

use clap::Parser;
use std::process::ExitCode;

use linear_context::cli::{Cli, Commands, ConfigAction, ContextAction, generate_completions};
use linear_context::commands::{
    CreateOptions, cmd_comment, cmd_config_get, cmd_config_set, cmd_config_show, cmd_connect,
    cmd_context_set, cmd_context_show, cmd_create, cmd_disconnect, cmd_issues, cmd_members,
    cmd_priorities, cmd_set_status, cmd_show, cmd_states, cmd_status, cmd_teams, cmd_whoami,
};

#[tokio::main]
async fn main() -> ExitCode {
    linear_context::logging::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Connect { method } => cmd_connect(method).await,
        Commands::Disconnect { sign_out } => cmd_disconnect(sign_out).await,
        Commands::Status { output } => cmd_status(output).await,
        Commands::Whoami { output } => cmd_whoami(output).await,

        Commands::Issues { output } => cmd_issues(output).await,
        Commands::Teams { output } => cmd_teams(output).await,
        Commands::States { team, output } => cmd_states(team.as_deref(), output).await,
        Commands::Priorities { output } => cmd_priorities(output).await,
        Commands::Members { team, output } => cmd_members(&team, output).await,
        Commands::Show {
            identifier,
            set_context,
            output,
        } => cmd_show(&identifier, set_context, output).await,

        Commands::Context { action } => match action {
            ContextAction::Set { issue } => cmd_context_set(&issue).await,
            ContextAction::Show { details, output } => cmd_context_show(details, output).await,
        },
        Commands::Comment { text } => cmd_comment(&text).await,
        Commands::SetStatus { state } => cmd_set_status(&state).await,

        Commands::Create {
            title,
            team,
            description,
            assignee,
            state,
            estimate,
            priority,
            set_context,
            output,
        } => {
            cmd_create(
                CreateOptions {
                    title,
                    team,
                    description,
                    assignee,
                    state,
                    estimate,
                    priority,
                    set_context,
                },
                output,
            )
            .await
        }

        Commands::Config { action } => match action {
            ConfigAction::Show { output } => cmd_config_show(output),
            ConfigAction::Set { key, value } => cmd_config_set(&key, &value),
            ConfigAction::Get { key } => cmd_config_get(&key),
        },
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

use owo_colors::OwoColorize;
use serde_json::json;

use super::resolve::{find_state, find_team};
use super::{CommandOutput, Manager, connected};
use crate::cli::OutputOptions;
use crate::error::{LctxError, Result};
use crate::linear::NewIssue;

/// Options for creating a new issue, as typed on the command line
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub title: String,
    /// Team key, name or ID
    pub team: String,
    pub description: Option<String>,
    /// User ID, or "me"
    pub assignee: Option<String>,
    /// Workflow state name or ID
    pub state: Option<String>,
    pub estimate: Option<i32>,
    pub priority: Option<i32>,
    pub set_context: bool,
}

/// Turn typed references (team key, state name, "me") into IDs
async fn build_new_issue(manager: &Manager, options: &CreateOptions) -> Result<NewIssue> {
    let teams = manager.try_my_teams().await?;
    let team = find_team(&teams, &options.team)?;

    let mut issue = NewIssue::new(options.title.trim(), team.id.clone());
    issue.description = options.description.clone().filter(|d| !d.trim().is_empty());
    issue.estimate = options.estimate;
    issue.priority = options.priority;

    issue.assignee_id = match options.assignee.as_deref().map(str::trim) {
        Some("me") => Some(manager.try_viewer().await?.id),
        Some("") | None => None,
        Some(id) => Some(id.to_string()),
    };

    if let Some(state) = options.state.as_deref() {
        let states = manager.try_workflow_states().await?;
        let target = find_state(&states, state, Some(team.id.as_str()))?;
        issue.state_id = Some(target.id.clone());
    }
    Ok(issue)
}

/// Create an issue and print it
pub async fn cmd_create(options: CreateOptions, output: OutputOptions) -> Result<()> {
    let manager = connected().await?;
    let new_issue = build_new_issue(&manager, &options).await?;

    let created = manager
        .try_create_issue(&new_issue)
        .await?
        .ok_or_else(|| LctxError::Api("Linear did not create the issue".to_string()))?;

    let context_set = options.set_context
        && manager
            .set_context_issue_id(Some(created.id.as_str()))
            .await;
    if options.set_context && !context_set {
        eprintln!(
            "Warning: failed to save {} as the context issue",
            created.identifier
        );
    }

    // The creation handle only carries IDs; fall back to it if the lookup fails
    let issue = manager.resolve_created_issue(&created).await;

    let json_output = json!({
        "id": created.id,
        "identifier": created.identifier,
        "url": created.url,
        "issue": issue,
        "context_issue": context_set,
    });

    let mut text = match &issue {
        Some(issue) => format!("Created {} {}", issue.identifier.cyan(), issue.title),
        None => format!("Created {}", created.identifier.cyan()),
    };
    text.push_str(&format!("\n{}", created.url.dimmed()));
    if context_set {
        text.push_str("\nSet as the context issue");
    }

    CommandOutput::new(json_output).with_text(text).print(output)
}

//! Read-only listing commands.

use owo_colors::OwoColorize;

use super::resolve::find_team;
use super::{CommandOutput, connected};
use crate::cli::OutputOptions;
use crate::display::{
    IssueRow, StateRow, TeamRow, UserRow, format_issue, priority_label, render_table,
};
use crate::error::{LctxError, Result};

fn empty_or_table(empty: &str, table: String, is_empty: bool) -> String {
    if is_empty {
        empty.dimmed().to_string()
    } else {
        table
    }
}

pub async fn cmd_issues(output: OutputOptions) -> Result<()> {
    let manager = connected().await?;
    let issues = manager.try_my_issues().await?;

    let text = empty_or_table(
        "No issues assigned to you",
        render_table(issues.iter().map(IssueRow::from)),
        issues.is_empty(),
    );
    CommandOutput::new(serde_json::to_value(&issues)?)
        .with_text(text)
        .print(output)
}

pub async fn cmd_teams(output: OutputOptions) -> Result<()> {
    let manager = connected().await?;
    let teams = manager.try_my_teams().await?;

    let text = empty_or_table(
        "You are not a member of any team",
        render_table(teams.iter().map(TeamRow::from)),
        teams.is_empty(),
    );
    CommandOutput::new(serde_json::to_value(&teams)?)
        .with_text(text)
        .print(output)
}

pub async fn cmd_states(team: Option<&str>, output: OutputOptions) -> Result<()> {
    let manager = connected().await?;
    let mut states = manager.try_workflow_states().await?;

    if let Some(query) = team {
        let teams = manager.try_my_teams().await?;
        let team = find_team(&teams, query)?;
        states.retain(|s| s.team_id == team.id);
    }
    states.sort_by(|a, b| {
        a.team_key
            .cmp(&b.team_key)
            .then(a.position.total_cmp(&b.position))
    });

    let text = empty_or_table(
        "No workflow states",
        render_table(states.iter().map(StateRow::from)),
        states.is_empty(),
    );
    CommandOutput::new(serde_json::to_value(&states)?)
        .with_text(text)
        .print(output)
}

pub async fn cmd_priorities(output: OutputOptions) -> Result<()> {
    let manager = connected().await?;
    let priorities = manager.try_available_priorities().await?;

    let text = priorities
        .iter()
        .map(|p| {
            let label = if p.label.is_empty() {
                priority_label(p.priority)
            } else {
                p.label.as_str()
            };
            format!("{}  {}", p.priority.to_string().cyan(), label)
        })
        .collect::<Vec<_>>()
        .join("\n");
    CommandOutput::new(serde_json::to_value(&priorities)?)
        .with_text(text)
        .print(output)
}

pub async fn cmd_members(team: &str, output: OutputOptions) -> Result<()> {
    let manager = connected().await?;
    let teams = manager.try_my_teams().await?;
    let team = find_team(&teams, team)?;
    let members = manager.try_team_members(&team.id).await?;

    let text = empty_or_table(
        "No members",
        render_table(members.iter().map(UserRow::from)),
        members.is_empty(),
    );
    CommandOutput::new(serde_json::to_value(&members)?)
        .with_text(text)
        .print(output)
}

/// Show an issue; optionally make it the context issue
pub async fn cmd_show(identifier: &str, set_context: bool, output: OutputOptions) -> Result<()> {
    let manager = connected().await?;
    let issue = manager
        .try_issue_by_identifier(identifier)
        .await?
        .ok_or_else(|| LctxError::IssueNotFound(identifier.to_string()))?;

    let mut text = format_issue(&issue);
    if set_context {
        if !manager.set_context_issue_id(Some(issue.id.as_str())).await {
            return Err(LctxError::Other(
                "failed to save the context issue".to_string(),
            ));
        }
        text.push_str(&format!("\nContext issue set to {}", issue.identifier.cyan()));
    }

    CommandOutput::new(serde_json::to_value(&issue)?)
        .with_text(text)
        .print(output)
}


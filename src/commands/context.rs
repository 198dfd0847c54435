//! Commands acting on the workspace's context issue.

use owo_colors::OwoColorize;

use super::resolve::find_state;
use super::{CommandOutput, connected, text_or_stdin};
use crate::cli::OutputOptions;
use crate::display::{format_issue, format_issue_details};
use crate::error::{LctxError, Result};

/// Resolve `issue` (identifier or ID) and store its ID as the context issue
pub async fn cmd_context_set(issue: &str) -> Result<()> {
    let manager = connected().await?;
    let found = manager
        .try_issue_by_identifier(issue)
        .await?
        .ok_or_else(|| LctxError::IssueNotFound(issue.to_string()))?;

    if !manager.set_context_issue_id(Some(found.id.as_str())).await {
        return Err(LctxError::Other(
            "failed to save the context issue".to_string(),
        ));
    }
    println!("Context issue set to {}", found.to_string().cyan());
    Ok(())
}

pub async fn cmd_context_show(details: bool, output: OutputOptions) -> Result<()> {
    let manager = connected().await?;
    let Some(id) = manager.try_context_issue_id().await? else {
        return CommandOutput::new(serde_json::Value::Null)
            .with_text("No context issue set".dimmed().to_string())
            .print(output);
    };

    if details {
        let bundle = manager
            .try_context_issue_details()
            .await?
            .ok_or(LctxError::IssueNotFound(id))?;
        let text = format_issue_details(&bundle);
        return CommandOutput::new(serde_json::to_value(&bundle)?)
            .with_text(text)
            .print(output);
    }

    let issue = manager
        .try_context_issue()
        .await?
        .ok_or(LctxError::IssueNotFound(id))?;
    let text = format_issue(&issue);
    CommandOutput::new(serde_json::to_value(&issue)?)
        .with_text(text)
        .print(output)
}

/// Comment on the context issue; text comes from args or piped stdin
pub async fn cmd_comment(text: &[String]) -> Result<()> {
    let manager = connected().await?;
    let body = text_or_stdin(text)?;

    if !manager.try_add_context_issue_comment(&body).await? {
        return Err(LctxError::Api(
            "Linear did not accept the comment".to_string(),
        ));
    }
    println!("Comment added");
    Ok(())
}

/// Move the context issue to the state named (or identified) by `state`
pub async fn cmd_set_status(state: &str) -> Result<()> {
    let manager = connected().await?;
    let issue = match manager.try_context_issue().await? {
        Some(issue) => issue,
        None => match manager.try_context_issue_id().await? {
            Some(id) => return Err(LctxError::IssueNotFound(id)),
            None => return Err(LctxError::NoContextIssue),
        },
    };

    let states = manager.try_workflow_states().await?;
    let target = find_state(&states, state, Some(issue.state.team_id.as_str()))?;

    if !manager.try_set_context_issue_status(&target.id).await? {
        return Err(LctxError::Api(
            "Linear did not accept the status change".to_string(),
        ));
    }

    tracing::debug!(issue = %issue.identifier, state = %target.name, "context issue moved");
    println!(
        "{}: {} -> {}",
        issue.identifier.cyan(),
        issue.state.name.dimmed(),
        target.name.green()
    );
    Ok(())
}

//! Terminal formatting for Linear entities.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::linear::{Comment, Issue, IssueDetails, Team, User, WorkflowState};

/// Label for a Linear priority value.
pub fn priority_label(priority: i32) -> &'static str {
    match priority {
        1 => "Urgent",
        2 => "High",
        3 => "Medium",
        4 => "Low",
        _ => "No priority",
    }
}

/// Render an ISO 8601 timestamp as `YYYY-MM-DD HH:MM` (UTC); unparseable
/// values are shown as-is.
pub fn format_timestamp(iso: &str) -> String {
    match iso.parse::<jiff::Timestamp>() {
        Ok(ts) => ts.strftime("%Y-%m-%d %H:%M").to_string(),
        Err(_) => iso.to_string(),
    }
}

fn colored_state(state: &WorkflowState) -> String {
    let label = format!("[{}]", state.name);
    match state.kind.as_str() {
        "completed" => label.green().to_string(),
        "canceled" => label.dimmed().to_string(),
        "started" => label.yellow().to_string(),
        _ => label,
    }
}

fn colored_priority(priority: i32) -> String {
    let label = priority_label(priority);
    match priority {
        1 => label.red().bold().to_string(),
        2 => label.yellow().to_string(),
        _ => label.dimmed().to_string(),
    }
}

fn user_label(user: Option<&User>) -> String {
    user.map(|u| u.display_name.clone())
        .unwrap_or_else(|| "unassigned".to_string())
}

/// Render rows as a rounded table.
pub fn render_table<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

#[derive(Tabled)]
pub struct IssueRow {
    #[tabled(rename = "ID")]
    pub identifier: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Priority")]
    pub priority: String,
    #[tabled(rename = "Title")]
    pub title: String,
}

impl From<&Issue> for IssueRow {
    fn from(issue: &Issue) -> Self {
        Self {
            identifier: issue.identifier.clone(),
            status: issue.state.name.clone(),
            priority: priority_label(issue.priority).to_string(),
            title: issue.title.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct TeamRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "ID")]
    pub id: String,
}

impl From<&Team> for TeamRow {
    fn from(team: &Team) -> Self {
        Self {
            key: team.key.clone(),
            name: team.name.clone(),
            id: team.id.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct StateRow {
    #[tabled(rename = "Team")]
    pub team: String,
    #[tabled(rename = "State")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "ID")]
    pub id: String,
}

impl From<&WorkflowState> for StateRow {
    fn from(state: &WorkflowState) -> Self {
        Self {
            team: state.team_key.clone(),
            name: state.name.clone(),
            kind: state.kind.clone(),
            id: state.id.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct UserRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Display name")]
    pub display_name: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "ID")]
    pub id: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            id: user.id.clone(),
        }
    }
}

/// Multi-line issue view
pub fn format_issue(issue: &Issue) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n",
        issue.identifier.cyan().bold(),
        issue.title.bold()
    ));
    out.push_str(&format!(
        "{} {}  {}",
        colored_state(&issue.state),
        colored_priority(issue.priority),
        issue.url.dimmed()
    ));
    if let Some(estimate) = issue.estimate {
        out.push_str(&format!("  estimate: {estimate}"));
    }
    out.push('\n');
    out.push_str(&format!("{} {}\n", "branch:".dimmed(), issue.branch_name));

    if let Some(description) = issue.description.as_deref().filter(|d| !d.trim().is_empty()) {
        out.push('\n');
        out.push_str(description.trim_end());
        out.push('\n');
    }
    out
}

fn format_comment(comment: &Comment) -> String {
    let author = comment
        .author
        .as_ref()
        .map(|a| a.display_name.as_str())
        .unwrap_or("unknown");
    format!(
        "{} {}\n{}\n",
        author.cyan(),
        format_timestamp(&comment.created_at).dimmed(),
        comment.body.trim_end()
    )
}

/// Issue view with assignee, creator, team, subscribers and comments
pub fn format_issue_details(details: &IssueDetails) -> String {
    let mut out = format_issue(&details.issue);
    out.push('\n');

    let team = details
        .team
        .as_ref()
        .map(|t| format!("{} ({})", t.name, t.key))
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!("{:12} {}\n", "team:".dimmed(), team));
    out.push_str(&format!(
        "{:12} {}\n",
        "assignee:".dimmed(),
        user_label(details.assignee.as_ref())
    ));
    out.push_str(&format!(
        "{:12} {}\n",
        "creator:".dimmed(),
        details
            .creator
            .as_ref()
            .map(|c| c.display_name.as_str())
            .unwrap_or("-")
    ));
    let subscribers = if details.subscribers.is_empty() {
        "-".to_string()
    } else {
        details
            .subscribers
            .iter()
            .map(|s| s.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    out.push_str(&format!("{:12} {}\n", "subscribers:".dimmed(), subscribers));

    if !details.comments.is_empty() {
        out.push_str(&format!(
            "\n{} ({})\n",
            "Comments".bold(),
            details.comments.len()
        ));
        for comment in &details.comments {
            out.push('\n');
            out.push_str(&format_comment(comment));
        }
    }
    out
}

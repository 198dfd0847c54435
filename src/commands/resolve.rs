//! Match user-typed team and workflow state references against fetched lists.

use crate::error::{LctxError, Result};
use crate::linear::{Team, WorkflowState};

/// Find a team by ID, key or name (key and name case-insensitive).
pub fn find_team<'a>(teams: &'a [Team], query: &str) -> Result<&'a Team> {
    let query = query.trim();
    teams
        .iter()
        .find(|t| t.id == query)
        .or_else(|| teams.iter().find(|t| t.key.eq_ignore_ascii_case(query)))
        .or_else(|| teams.iter().find(|t| t.name.eq_ignore_ascii_case(query)))
        .ok_or_else(|| {
            let keys: Vec<&str> = teams.iter().map(|t| t.key.as_str()).collect();
            LctxError::Validation(format!(
                "no team matching '{query}' (your teams: {})",
                keys.join(", ")
            ))
        })
}

/// Find a workflow state by ID or name. Name lookups are limited to
/// `team_id` when given, and must be unambiguous otherwise.
pub fn find_state<'a>(
    states: &'a [WorkflowState],
    query: &str,
    team_id: Option<&str>,
) -> Result<&'a WorkflowState> {
    let query = query.trim();
    if let Some(state) = states.iter().find(|s| s.id == query) {
        return Ok(state);
    }

    let matches: Vec<&WorkflowState> = states
        .iter()
        .filter(|s| team_id.is_none_or(|team| s.team_id == team))
        .filter(|s| s.name.eq_ignore_ascii_case(query))
        .collect();

    match matches.as_slice() {
        [state] => Ok(state),
        [] => Err(LctxError::Validation(format!(
            "no workflow state matching '{query}'"
        ))),
        many => {
            let teams: Vec<&str> = many.iter().map(|s| s.team_key.as_str()).collect();
            Err(LctxError::Validation(format!(
                "workflow state '{query}' exists in several teams ({}); pass its ID",
                teams.join(", ")
            )))
        }
    }
}

//! Linear domain types and the remote API seam.
//!
//! Everything the session layer knows about Linear goes through the
//! [`LinearApi`] trait. [`LinearClient`] is the GraphQL implementation; tests
//! substitute their own.

pub mod client;
mod graphql;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::auth::Credential;
use crate::error::Result;

pub use client::{HttpConnector, LinearClient};

/// Upper bound on comments and subscribers fetched for a detail bundle.
pub const DETAIL_FETCH_LIMIT: u32 = 100;

/// Upper bound on workflow states fetched in one call.
pub const WORKFLOW_STATES_LIMIT: u32 = 100;

/// A Linear user (assignee, creator, subscriber, comment author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub key: String,
    pub name: String,
}

/// A named status value an issue can be moved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    /// One of triage, backlog, unstarted, started, completed, canceled
    pub kind: String,
    pub color: String,
    pub position: f64,
    pub team_id: String,
    pub team_key: String,
}

/// Priority value and its label, as published by the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityValue {
    pub priority: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Internal UUID
    pub id: String,
    /// Human-readable identifier, e.g. ENG-123
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    /// 0 = none, 1 = urgent, 2 = high, 3 = medium, 4 = low
    pub priority: i32,
    pub priority_label: String,
    pub estimate: Option<f64>,
    pub state: WorkflowState,
    pub url: String,
    pub branch_name: String,
    /// ISO 8601
    pub created_at: String,
    /// ISO 8601
    pub updated_at: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identifier, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub author: Option<User>,
    /// ISO 8601
    pub created_at: String,
    pub url: String,
}

/// An issue with its related entities, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDetails {
    pub issue: Issue,
    pub assignee: Option<User>,
    pub creator: Option<User>,
    pub team: Option<Team>,
    pub subscribers: Vec<User>,
    /// Oldest first, as returned by the API
    pub comments: Vec<Comment>,
}

/// Fields for a new issue. Title and team are required by Linear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewIssue {
    pub title: String,
    pub team_id: String,
    pub description: Option<String>,
    pub assignee_id: Option<String>,
    pub state_id: Option<String>,
    pub estimate: Option<i32>,
    pub priority: Option<i32>,
}

impl NewIssue {
    pub fn new(title: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            team_id: team_id.into(),
            ..Default::default()
        }
    }
}

/// An issue update: moving the issue to another workflow state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueUpdate {
    pub state_id: String,
}

impl IssueUpdate {
    pub fn state(state_id: impl Into<String>) -> Self {
        Self {
            state_id: state_id.into(),
        }
    }
}

/// Handle to a freshly created issue.
///
/// The mutation only returns identifying fields; the full issue is resolved
/// on demand through [`crate::session::ContextManager::resolve_created_issue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub identifier: String,
    pub url: String,
}

/// Result of an `issueCreate` mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCreateOutcome {
    pub success: bool,
    pub issue: Option<CreatedIssue>,
}

/// Remote operations against the Linear API.
pub trait LinearApi: Send + Sync {
    /// The authenticated user
    fn viewer(&self) -> impl Future<Output = Result<User>> + Send;

    /// Issues assigned to the authenticated user
    fn assigned_issues(&self, first: u32) -> impl Future<Output = Result<Vec<Issue>>> + Send;

    /// Teams the authenticated user belongs to
    fn my_teams(&self, first: u32) -> impl Future<Output = Result<Vec<Team>>> + Send;

    fn team_members(
        &self,
        team_id: &str,
        first: u32,
    ) -> impl Future<Output = Result<Vec<User>>> + Send;

    fn workflow_states(&self, first: u32)
    -> impl Future<Output = Result<Vec<WorkflowState>>> + Send;

    fn priority_values(&self) -> impl Future<Output = Result<Vec<PriorityValue>>> + Send;

    /// Fetch an issue by UUID or identifier. `Ok(None)` when Linear reports it missing.
    fn issue(&self, id: &str) -> impl Future<Output = Result<Option<Issue>>> + Send;

    fn issue_assignee(&self, issue_id: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    fn issue_creator(&self, issue_id: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    fn issue_team(&self, issue_id: &str) -> impl Future<Output = Result<Option<Team>>> + Send;

    fn issue_subscribers(
        &self,
        issue_id: &str,
        first: u32,
    ) -> impl Future<Output = Result<Vec<User>>> + Send;

    fn issue_comments(
        &self,
        issue_id: &str,
        first: u32,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    fn create_issue(
        &self,
        issue: &NewIssue,
    ) -> impl Future<Output = Result<IssueCreateOutcome>> + Send;

    /// Returns the remote `success` flag
    fn update_issue(
        &self,
        issue_id: &str,
        update: &IssueUpdate,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Returns the remote `success` flag
    fn create_comment(
        &self,
        issue_id: &str,
        body: &str,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Builds an API client for a credential.
pub trait Connector: Send + Sync {
    type Client: LinearApi;

    fn connect(&self, credential: Credential) -> Result<Self::Client>;
}

//! Typed GraphQL operations against the Linear schema.

// Re-export cynic types we need
pub use cynic::{GraphQlResponse, MutationBuilder, QueryBuilder};

// The import MUST be named `schema` for cynic derives to work.
use linear_context_schema::linear as schema;

use serde::Deserialize;

/// Custom error extensions type for Linear API errors
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub typ: Option<String>,
    pub user_error: Option<bool>,
    pub user_presentable_message: Option<String>,
}

// Custom Scalars

/// DateTime scalar from Linear API (ISO 8601 formatted string)
#[derive(cynic::Scalar, Debug, Clone)]
#[cynic(graphql_type = "DateTime")]
pub struct DateTime(pub String);

// Query Variables

#[derive(cynic::QueryVariables, Debug)]
pub struct PageVariables {
    pub first: Option<i32>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct IssueQueryVariables {
    pub id: String,
}

/// Variables for an issue's paginated relations (subscribers, comments)
#[derive(cynic::QueryVariables, Debug)]
pub struct IssueListVariables {
    pub id: String,
    pub first: Option<i32>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct TeamMembersVariables {
    pub id: String,
    pub first: Option<i32>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct IssueCreateVariables {
    pub input: IssueCreateInput,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct IssueUpdateVariables {
    pub id: String,
    pub input: IssueUpdateInput,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct CommentCreateVariables {
    pub input: CommentCreateInput,
}

// Input Objects

#[derive(cynic::InputObject, Debug, Clone, Default)]
#[cynic(rename_all = "camelCase")]
pub struct IssueCreateInput {
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub team_id: String,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<i32>,
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

#[derive(cynic::InputObject, Debug, Clone, Default)]
#[cynic(rename_all = "camelCase")]
pub struct IssueUpdateInput {
    #[cynic(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
}

#[derive(cynic::InputObject, Debug, Clone, Default)]
#[cynic(rename_all = "camelCase")]
pub struct CommentCreateInput {
    pub body: Option<String>,
    pub issue_id: Option<String>,
}

// Shared fragments

#[derive(cynic::QueryFragment, Debug, Clone)]
pub struct User {
    pub id: cynic::Id,
    pub name: String,
    pub display_name: String,
    pub email: String,
}

#[derive(cynic::QueryFragment, Debug, Clone)]
pub struct Team {
    pub id: cynic::Id,
    pub key: String,
    pub name: String,
}

#[derive(cynic::QueryFragment, Debug, Clone)]
pub struct WorkflowState {
    pub id: cynic::Id,
    pub name: String,
    #[cynic(rename = "type")]
    pub state_type: String,
    pub color: String,
    pub position: f64,
    pub team: Team,
}

#[derive(cynic::QueryFragment, Debug, Clone)]
pub struct Issue {
    pub id: cynic::Id,
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: f64,
    pub priority_label: String,
    pub estimate: Option<f64>,
    pub state: WorkflowState,
    pub url: String,
    pub branch_name: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(cynic::QueryFragment, Debug, Clone)]
pub struct Comment {
    pub id: cynic::Id,
    pub body: String,
    pub user: Option<User>,
    pub created_at: DateTime,
    pub url: String,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct IssuePriorityValue {
    pub priority: i32,
    pub label: String,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct IssueConnection {
    pub nodes: Vec<Issue>,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct TeamConnection {
    pub nodes: Vec<Team>,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct UserConnection {
    pub nodes: Vec<User>,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct WorkflowStateConnection {
    pub nodes: Vec<WorkflowState>,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct CommentConnection {
    pub nodes: Vec<Comment>,
}

// Viewer

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct ViewerQuery {
    pub viewer: User,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "PageVariables")]
pub struct ViewerIssuesQuery {
    pub viewer: ViewerIssues,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "User", variables = "PageVariables")]
pub struct ViewerIssues {
    #[arguments(first: $first)]
    pub assigned_issues: IssueConnection,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "PageVariables")]
pub struct ViewerTeamsQuery {
    pub viewer: ViewerTeams,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "User", variables = "PageVariables")]
pub struct ViewerTeams {
    #[arguments(first: $first)]
    pub teams: TeamConnection,
}

// Teams, states, priorities

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "TeamMembersVariables")]
pub struct TeamMembersQuery {
    #[arguments(id: $id)]
    pub team: TeamMembers,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Team", variables = "TeamMembersVariables")]
pub struct TeamMembers {
    #[arguments(first: $first)]
    pub members: UserConnection,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "PageVariables")]
pub struct WorkflowStatesQuery {
    #[arguments(first: $first)]
    pub workflow_states: WorkflowStateConnection,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct PriorityValuesQuery {
    pub issue_priority_values: Vec<IssuePriorityValue>,
}

// Issue and its relations

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "IssueQueryVariables")]
pub struct IssueQuery {
    #[arguments(id: $id)]
    pub issue: Issue,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "IssueQueryVariables")]
pub struct IssueAssigneeQuery {
    #[arguments(id: $id)]
    pub issue: IssueAssignee,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Issue")]
pub struct IssueAssignee {
    pub assignee: Option<User>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "IssueQueryVariables")]
pub struct IssueCreatorQuery {
    #[arguments(id: $id)]
    pub issue: IssueCreator,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Issue")]
pub struct IssueCreator {
    pub creator: Option<User>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "IssueQueryVariables")]
pub struct IssueTeamQuery {
    #[arguments(id: $id)]
    pub issue: IssueTeam,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Issue")]
pub struct IssueTeam {
    pub team: Team,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "IssueListVariables")]
pub struct IssueSubscribersQuery {
    #[arguments(id: $id)]
    pub issue: IssueSubscribers,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Issue", variables = "IssueListVariables")]
pub struct IssueSubscribers {
    #[arguments(first: $first)]
    pub subscribers: UserConnection,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "IssueListVariables")]
pub struct IssueCommentsQuery {
    #[arguments(id: $id)]
    pub issue: IssueComments,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Issue", variables = "IssueListVariables")]
pub struct IssueComments {
    #[arguments(first: $first)]
    pub comments: CommentConnection,
}

// Mutations

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "IssueCreateVariables")]
pub struct IssueCreateMutation {
    #[arguments(input: $input)]
    pub issue_create: IssueCreatePayload,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "IssuePayload")]
pub struct IssueCreatePayload {
    pub success: bool,
    pub issue: Option<CreatedIssue>,
}

/// Issue fragment for a created issue (minimal fields)
#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Issue")]
pub struct CreatedIssue {
    pub id: cynic::Id,
    pub identifier: String,
    pub url: String,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "IssueUpdateVariables")]
pub struct IssueUpdateMutation {
    #[arguments(id: $id, input: $input)]
    pub issue_update: IssueUpdatePayload,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "IssuePayload")]
pub struct IssueUpdatePayload {
    pub success: bool,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "CommentCreateVariables")]
pub struct CommentCreateMutation {
    #[arguments(input: $input)]
    pub comment_create: CommentCreatePayload,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "CommentPayload")]
pub struct CommentCreatePayload {
    pub success: bool,
}

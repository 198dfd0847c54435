//! Linear.app GraphQL client using type-safe cynic operations.
//!
//! # Security Note - Logging
//!
//! Credentials are protected from being logged through reqwest's request
//! logging by the `RedactedHeader` wrapper type, which implements `Display`
//! and `Debug` to redact sensitive values.
//!
//! **Important:** Ensure reqwest logging is disabled in production environments:
//!
//! ```bash
//! # Do NOT enable reqwest logging in production as it may still log other request details
//! # RUST_LOG=reqwest=debug  <-- AVOID IN PRODUCTION
//! ```

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use reqwest::header;
use secrecy::{ExposeSecret, SecretBox};

use crate::auth::Credential;
use crate::config::Config;
use crate::error::{GraphQlError, LctxError, Result};

use super::graphql::{self, *};
use super::{
    Comment, Connector, CreatedIssue, Issue, IssueCreateOutcome, IssueUpdate, LinearApi, NewIssue,
    PriorityValue, Team, User, WorkflowState,
};

/// Wrapper for sensitive header values that redacts the value when formatted.
///
/// This prevents API keys and OAuth tokens from being leaked in logs when
/// reqwest's logging is enabled (e.g., via RUST_LOG=reqwest=debug).
struct RedactedHeader {
    value: SecretBox<String>,
}

impl RedactedHeader {
    fn new(value: String) -> Self {
        Self {
            value: SecretBox::new(Box::new(value)),
        }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        let mut value = header::HeaderValue::from_str(self.value.expose_secret())
            .map_err(|_| LctxError::Auth("credential contains invalid characters".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Authenticated Linear API client.
pub struct LinearClient {
    client: Client,
    api_url: String,
    authorization: RedactedHeader,
}

impl LinearClient {
    /// Create a client for a credential.
    ///
    /// Configures the HTTP client with the given total timeout and a connect
    /// timeout of at most 10s.
    pub fn new(credential: Credential, api_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!("lctx/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let authorization = RedactedHeader::new(credential.authorization_value());
        // Reject unusable credentials before the first request
        authorization.as_header_value()?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            authorization,
        })
    }

    /// Execute a GraphQL operation (query or mutation).
    ///
    /// Security: The Authorization header is wrapped in `RedactedHeader` to prevent
    /// the credential from being logged if reqwest's debug logging is enabled.
    async fn execute<ResponseData, Vars>(
        &self,
        operation: cynic::Operation<ResponseData, Vars>,
    ) -> Result<ResponseData>
    where
        ResponseData: serde::de::DeserializeOwned + 'static,
        Vars: serde::Serialize,
    {
        let response = self
            .client
            .post(&self.api_url)
            .header(header::AUTHORIZATION, self.authorization.as_header_value()?)
            .header(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            )
            .json(&operation)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LctxError::Auth(format!(
                "Linear rejected the credential (HTTP {status})"
            )));
        }

        // Linear reports GraphQL failures with 400 and an error body, so only
        // bail out early when there is no body worth decoding.
        if !status.is_success() && status != reqwest::StatusCode::BAD_REQUEST {
            return Err(LctxError::Api(format!("Linear API error: HTTP {status}")));
        }

        let result: GraphQlResponse<ResponseData, ErrorExtensions> = response.json().await?;

        // Handle GraphQL errors - preserve individual error details
        if let Some(errors) = result.errors
            && !errors.is_empty()
        {
            let structured_errors: Vec<GraphQlError> = errors
                .iter()
                .map(|e| {
                    let code = e.extensions.as_ref().and_then(|ext| ext.code.clone());
                    let path = e.path.as_ref().map(|p| {
                        p.iter()
                            .map(|segment| match segment {
                                cynic::GraphQlErrorPathSegment::Field(name) => name.clone(),
                                cynic::GraphQlErrorPathSegment::Index(idx) => idx.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(".")
                    });
                    let message = e
                        .extensions
                        .as_ref()
                        .and_then(|ext| ext.user_presentable_message.clone())
                        .unwrap_or_else(|| e.message.clone());
                    GraphQlError {
                        message,
                        code,
                        path,
                    }
                })
                .collect();

            return Err(LctxError::GraphQlErrors {
                errors: structured_errors,
            });
        }

        result
            .data
            .ok_or_else(|| LctxError::Api("No data in Linear response".to_string()))
    }
}

fn page(first: u32) -> Option<i32> {
    Some(i32::try_from(first).unwrap_or(i32::MAX))
}

/// Map NOT_FOUND GraphQL errors to `None`.
fn found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

impl LinearApi for LinearClient {
    async fn viewer(&self) -> Result<User> {
        let response = self.execute(ViewerQuery::build(())).await?;
        Ok(convert_user(response.viewer))
    }

    async fn assigned_issues(&self, first: u32) -> Result<Vec<Issue>> {
        let operation = ViewerIssuesQuery::build(PageVariables { first: page(first) });
        let response = self.execute(operation).await?;
        Ok(response
            .viewer
            .assigned_issues
            .nodes
            .into_iter()
            .map(convert_issue)
            .collect())
    }

    async fn my_teams(&self, first: u32) -> Result<Vec<Team>> {
        let operation = ViewerTeamsQuery::build(PageVariables { first: page(first) });
        let response = self.execute(operation).await?;
        Ok(response
            .viewer
            .teams
            .nodes
            .into_iter()
            .map(convert_team)
            .collect())
    }

    async fn team_members(&self, team_id: &str, first: u32) -> Result<Vec<User>> {
        let operation = TeamMembersQuery::build(TeamMembersVariables {
            id: team_id.to_string(),
            first: page(first),
        });
        let response = self.execute(operation).await?;
        Ok(response
            .team
            .members
            .nodes
            .into_iter()
            .map(convert_user)
            .collect())
    }

    async fn workflow_states(&self, first: u32) -> Result<Vec<WorkflowState>> {
        let operation = WorkflowStatesQuery::build(PageVariables { first: page(first) });
        let response = self.execute(operation).await?;
        Ok(response
            .workflow_states
            .nodes
            .into_iter()
            .map(convert_state)
            .collect())
    }

    async fn priority_values(&self) -> Result<Vec<PriorityValue>> {
        let response = self.execute(PriorityValuesQuery::build(())).await?;
        Ok(response
            .issue_priority_values
            .into_iter()
            .map(|p| PriorityValue {
                priority: p.priority,
                label: p.label,
            })
            .collect())
    }

    async fn issue(&self, id: &str) -> Result<Option<Issue>> {
        let operation = IssueQuery::build(IssueQueryVariables { id: id.to_string() });
        let response = found(self.execute(operation).await)?;
        Ok(response.map(|r| convert_issue(r.issue)))
    }

    async fn issue_assignee(&self, issue_id: &str) -> Result<Option<User>> {
        let operation = IssueAssigneeQuery::build(IssueQueryVariables {
            id: issue_id.to_string(),
        });
        let response = self.execute(operation).await?;
        Ok(response.issue.assignee.map(convert_user))
    }

    async fn issue_creator(&self, issue_id: &str) -> Result<Option<User>> {
        let operation = IssueCreatorQuery::build(IssueQueryVariables {
            id: issue_id.to_string(),
        });
        let response = self.execute(operation).await?;
        Ok(response.issue.creator.map(convert_user))
    }

    async fn issue_team(&self, issue_id: &str) -> Result<Option<Team>> {
        let operation = IssueTeamQuery::build(IssueQueryVariables {
            id: issue_id.to_string(),
        });
        let response = found(self.execute(operation).await)?;
        Ok(response.map(|r| convert_team(r.issue.team)))
    }

    async fn issue_subscribers(&self, issue_id: &str, first: u32) -> Result<Vec<User>> {
        let operation = IssueSubscribersQuery::build(IssueListVariables {
            id: issue_id.to_string(),
            first: page(first),
        });
        let response = self.execute(operation).await?;
        Ok(response
            .issue
            .subscribers
            .nodes
            .into_iter()
            .map(convert_user)
            .collect())
    }

    async fn issue_comments(&self, issue_id: &str, first: u32) -> Result<Vec<Comment>> {
        let operation = IssueCommentsQuery::build(IssueListVariables {
            id: issue_id.to_string(),
            first: page(first),
        });
        let response = self.execute(operation).await?;
        Ok(response
            .issue
            .comments
            .nodes
            .into_iter()
            .map(convert_comment)
            .collect())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<IssueCreateOutcome> {
        let operation = IssueCreateMutation::build(IssueCreateVariables {
            input: create_input(issue),
        });
        let response = self.execute(operation).await?;
        Ok(IssueCreateOutcome {
            success: response.issue_create.success,
            issue: response.issue_create.issue.map(|created| CreatedIssue {
                id: created.id.into_inner(),
                identifier: created.identifier,
                url: created.url,
            }),
        })
    }

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> Result<bool> {
        let operation = IssueUpdateMutation::build(IssueUpdateVariables {
            id: issue_id.to_string(),
            input: IssueUpdateInput {
                state_id: Some(update.state_id.clone()),
            },
        });
        let response = self.execute(operation).await?;
        Ok(response.issue_update.success)
    }

    async fn create_comment(&self, issue_id: &str, body: &str) -> Result<bool> {
        let operation = CommentCreateMutation::build(CommentCreateVariables {
            input: CommentCreateInput {
                body: Some(body.to_string()),
                issue_id: Some(issue_id.to_string()),
            },
        });
        let response = self.execute(operation).await?;
        Ok(response.comment_create.success)
    }
}

/// Builds [`LinearClient`]s against the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    api_url: String,
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_url: api_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.timeout())
    }
}

impl Connector for HttpConnector {
    type Client = LinearClient;

    fn connect(&self, credential: Credential) -> Result<LinearClient> {
        LinearClient::new(credential, &self.api_url, self.timeout)
    }
}

fn create_input(issue: &NewIssue) -> graphql::IssueCreateInput {
    graphql::IssueCreateInput {
        title: Some(issue.title.clone()),
        description: issue.description.clone(),
        team_id: issue.team_id.clone(),
        assignee_id: issue.assignee_id.clone(),
        state_id: issue.state_id.clone(),
        estimate: issue.estimate,
        priority: issue.priority,
    }
}

fn convert_user(user: graphql::User) -> User {
    User {
        id: user.id.into_inner(),
        name: user.name,
        display_name: user.display_name,
        email: user.email,
    }
}

fn convert_team(team: graphql::Team) -> Team {
    Team {
        id: team.id.into_inner(),
        key: team.key,
        name: team.name,
    }
}

fn convert_state(state: graphql::WorkflowState) -> WorkflowState {
    WorkflowState {
        id: state.id.into_inner(),
        name: state.name,
        kind: state.state_type,
        color: state.color,
        position: state.position,
        team_id: state.team.id.into_inner(),
        team_key: state.team.key,
    }
}

fn convert_issue(issue: graphql::Issue) -> Issue {
    // Linear publishes priority as a float; anything outside 0-4 is treated as "no priority"
    let priority = match issue.priority as i32 {
        p @ 0..=4 => p,
        _ => 0,
    };

    Issue {
        id: issue.id.into_inner(),
        identifier: issue.identifier,
        title: issue.title,
        description: issue.description,
        priority,
        priority_label: issue.priority_label,
        estimate: issue.estimate,
        state: convert_state(issue.state),
        url: issue.url,
        branch_name: issue.branch_name,
        created_at: issue.created_at.0,
        updated_at: issue.updated_at.0,
    }
}

fn convert_comment(comment: graphql::Comment) -> Comment {
    Comment {
        id: comment.id.into_inner(),
        body: comment.body,
        author: comment.user.map(convert_user),
        created_at: comment.created_at.0,
        url: comment.url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_issue(priority: f64, description: Option<&str>) -> graphql::Issue {
        graphql::Issue {
            id: cynic::Id::new("uuid-1"),
            identifier: "ENG-123".to_string(),
            title: "Test Issue".to_string(),
            description: description.map(str::to_string),
            priority,
            priority_label: "High".to_string(),
            estimate: Some(3.0),
            state: graphql::WorkflowState {
                id: cynic::Id::new("state-1"),
                name: "In Progress".to_string(),
                state_type: "started".to_string(),
                color: "#f2c94c".to_string(),
                position: 2.0,
                team: graphql::Team {
                    id: cynic::Id::new("team-1"),
                    key: "ENG".to_string(),
                    name: "Engineering".to_string(),
                },
            },
            url: "https://linear.app/acme/issue/ENG-123".to_string(),
            branch_name: "eng-123-test-issue".to_string(),
            created_at: graphql::DateTime("2024-01-01T00:00:00Z".to_string()),
            updated_at: graphql::DateTime("2024-01-02T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_redacted_header_display() {
        let header = RedactedHeader::new("secret-api-key-12345".to_string());
        assert_eq!(format!("{}", header), "[REDACTED]");
    }

    #[test]
    fn test_redacted_header_debug() {
        let header = RedactedHeader::new("secret-api-key-12345".to_string());
        let debug_str = format!("{:?}", header);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret-api-key"));
    }

    #[test]
    fn test_redacted_header_as_header_value() {
        let header = RedactedHeader::new("Bearer token123".to_string());
        let header_value = header.as_header_value().unwrap();
        assert_eq!(header_value.to_str().unwrap(), "Bearer token123");
        assert!(header_value.is_sensitive());
    }

    #[test]
    fn test_invalid_credential_rejected() {
        let result = LinearClient::new(
            Credential::api_key("bad\nkey"),
            crate::config::DEFAULT_API_URL,
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(LctxError::Auth(_))));
    }

    #[test]
    fn test_issue_fields() {
        let converted = convert_issue(test_issue(2.0, Some("Description")));

        assert_eq!(converted.id, "uuid-1");
        assert_eq!(converted.identifier, "ENG-123");
        assert_eq!(converted.title, "Test Issue");
        assert_eq!(converted.description.as_deref(), Some("Description"));
        assert_eq!(converted.priority, 2);
        assert_eq!(converted.estimate, Some(3.0));
        assert_eq!(converted.state.name, "In Progress");
        assert_eq!(converted.state.team_key, "ENG");
        assert_eq!(converted.updated_at, "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_priority_out_of_range() {
        assert_eq!(convert_issue(test_issue(-1.0, None)).priority, 0);
        assert_eq!(convert_issue(test_issue(7.0, None)).priority, 0);
        assert_eq!(convert_issue(test_issue(4.0, None)).priority, 4);
    }

    #[test]
    fn test_issue_without_description() {
        let converted = convert_issue(test_issue(1.0, None));
        assert_eq!(converted.description, None);
    }

    #[test]
    fn test_comment_without_author() {
        let converted = convert_comment(graphql::Comment {
            id: cynic::Id::new("c1"),
            body: "Looks good".to_string(),
            user: None,
            created_at: graphql::DateTime("2024-01-01T00:00:00Z".to_string()),
            url: "https://linear.app/acme/issue/ENG-123#comment-c1".to_string(),
        });
        assert_eq!(converted.author, None);
        assert_eq!(converted.body, "Looks good");
    }

    #[test]
    fn test_create_input_carries_optional_fields() {
        let mut issue = NewIssue::new("Fix bug", "team-1");
        issue.priority = Some(2);
        let input = create_input(&issue);

        assert_eq!(input.title.as_deref(), Some("Fix bug"));
        assert_eq!(input.team_id, "team-1");
        assert_eq!(input.priority, Some(2));
        assert!(input.assignee_id.is_none());
        assert!(input.state_id.is_none());
    }
}

//! Session & context manager.
//!
//! [`ContextManager`] owns at most one authenticated Linear client and the
//! workspace's context issue id. Command handlers hold it by reference; there
//! is no global state, and mutating operations (`connect`, `disconnect`)
//! require `&mut self`.
//!
//! Public operations never return errors. Failures collapse to `false` or
//! `None` and are logged:
//!
//! | Failure              | Result          | Logged at |
//! |----------------------|-----------------|-----------|
//! | not connected        | `false`/`None`  | debug     |
//! | missing argument     | `false`/`None`  | debug     |
//! | prompt dismissed     | `false`         | info      |
//! | remote/storage error | `false`/`None`  | warn      |
//!
//! Callers that need the reason use the `try_` variants.

use std::future::Future;
use std::sync::Arc;

use crate::auth::{AuthMethod, Credential, SessionProvider};
use crate::error::{DetailPart, LctxError, Result};
use crate::linear::{
    Connector, CreatedIssue, DETAIL_FETCH_LIMIT, Issue, IssueDetails, IssueUpdate,
    LinearApi, NewIssue, PriorityValue, Team, User, WORKFLOW_STATES_LIMIT, WorkflowState,
};
use crate::prompt::Prompter;
use crate::storage::{API_KEY, CONTEXT_ISSUE_KEY, SecretStore, WorkspaceState};

/// Default number of items fetched by list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Lifecycle of the authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// Only observable while `connect` is prompting
    Authenticating,
    Authenticated(AuthMethod),
}

/// Injected collaborators of a [`ContextManager`].
pub struct Collaborators {
    pub sessions: Arc<dyn SessionProvider>,
    pub secrets: Arc<dyn SecretStore>,
    pub workspace: Arc<dyn WorkspaceState>,
    pub prompter: Arc<dyn Prompter>,
}

pub struct ContextManager<C: Connector> {
    connector: C,
    sessions: Arc<dyn SessionProvider>,
    secrets: Arc<dyn SecretStore>,
    workspace: Arc<dyn WorkspaceState>,
    prompter: Arc<dyn Prompter>,
    scopes: Vec<String>,
    page_size: u32,
    client: Option<C::Client>,
    state: SessionState,
}

fn settle<T>(operation: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(LctxError::Cancelled) => {
            tracing::info!(operation, "cancelled by user");
            None
        }
        Err(
            e @ (LctxError::NotAuthenticated
            | LctxError::NoContextIssue
            | LctxError::Validation(_)),
        ) => {
            tracing::debug!(operation, "{e}");
            None
        }
        Err(e) => {
            tracing::warn!(operation, error = %e, "Linear operation failed");
            None
        }
    }
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LctxError::Validation(format!("{what} is required")));
    }
    Ok(())
}

async fn detail_part<T>(part: DetailPart, fetch: impl Future<Output = Result<T>>) -> Result<T> {
    fetch.await.map_err(|source| LctxError::DetailFetch {
        part,
        source: Box::new(source),
    })
}

impl<C: Connector> ContextManager<C> {
    pub fn new(connector: C, collaborators: Collaborators) -> Self {
        Self {
            connector,
            sessions: collaborators.sessions,
            secrets: collaborators.secrets,
            workspace: collaborators.workspace,
            prompter: collaborators.prompter,
            scopes: vec!["read".to_string(), "write".to_string()],
            page_size: DEFAULT_PAGE_SIZE,
            client: None,
            state: SessionState::Unauthenticated,
        }
    }

    /// OAuth scopes requested from the session provider.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    pub fn auth_method(&self) -> Option<AuthMethod> {
        match self.state {
            SessionState::Authenticated(method) => Some(method),
            _ => None,
        }
    }

    fn client(&self) -> Result<&C::Client> {
        self.client.as_ref().ok_or(LctxError::NotAuthenticated)
    }

    fn establish(&mut self, client: C::Client, method: AuthMethod) {
        self.client = Some(client);
        self.state = SessionState::Authenticated(method);
    }

    // Session lifecycle

    /// Restore a session without prompting.
    ///
    /// An existing OAuth session always takes precedence; the stored API key
    /// is only consulted when the provider has none. Returns whether a usable
    /// session now exists.
    pub async fn initialize(&mut self) -> bool {
        match self.restore().await {
            Ok(Some((client, method))) => {
                tracing::debug!(%method, "restored Linear session");
                self.establish(client, method);
                true
            }
            Ok(None) => {
                tracing::debug!("no stored Linear credentials");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to restore Linear session");
                false
            }
        }
    }

    async fn restore(&self) -> Result<Option<(C::Client, AuthMethod)>> {
        match self.sessions.session(&self.scopes).await {
            Ok(Some(session)) => {
                let client = self.connector.connect(session.credential())?;
                return Ok(Some((client, AuthMethod::OAuth)));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "OAuth session lookup failed; trying API key"),
        }

        match self.secrets.get(API_KEY).await? {
            Some(key) if !key.trim().is_empty() => {
                let client = self.connector.connect(Credential::api_key(key.trim()))?;
                Ok(Some((client, AuthMethod::ApiKey)))
            }
            _ => Ok(None),
        }
    }

    /// Interactively connect, letting the user choose the method.
    pub async fn connect(&mut self) -> bool {
        self.connect_with(None).await
    }

    /// Interactively connect. `method` skips the method picker.
    ///
    /// On cancellation or failure the previous session (if any) stays in place.
    pub async fn connect_with(&mut self, method: Option<AuthMethod>) -> bool {
        let previous = self.state;
        self.state = SessionState::Authenticating;

        match self.authenticate(method).await {
            Ok((client, method)) => {
                self.establish(client, method);
                self.prompter.info("Connected to Linear.");
                true
            }
            Err(LctxError::Cancelled) => {
                tracing::info!("connect cancelled by user");
                self.state = previous;
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to connect to Linear");
                self.prompter
                    .error(&format!("Failed to connect to Linear: {e}"));
                self.state = previous;
                false
            }
        }
    }

    async fn authenticate(&self, method: Option<AuthMethod>) -> Result<(C::Client, AuthMethod)> {
        let method = match method {
            Some(method) => method,
            None => {
                let labels: Vec<String> = AuthMethod::ALL
                    .iter()
                    .map(|m| m.label().to_string())
                    .collect();
                let choice = self
                    .prompter
                    .pick("Connect to Linear", &labels)
                    .await
                    .ok_or(LctxError::Cancelled)?;
                *AuthMethod::ALL.get(choice).ok_or(LctxError::Cancelled)?
            }
        };

        match method {
            AuthMethod::OAuth => {
                let session = self
                    .sessions
                    .session_or_create(&self.scopes)
                    .await?
                    .ok_or(LctxError::Cancelled)?;
                let client = self.connector.connect(session.credential())?;
                match client.viewer().await {
                    Ok(viewer) => {
                        tracing::info!(user = %viewer.name, "connected with OAuth");
                        Ok((client, AuthMethod::OAuth))
                    }
                    Err(LctxError::Auth(reason)) => {
                        // Forget it so the next restore can fall back to the API key
                        if let Err(e) = self.sessions.remove().await {
                            tracing::warn!(error = %e, "failed to forget rejected OAuth session");
                        }
                        Err(LctxError::Auth(format!("OAuth token was rejected: {reason}")))
                    }
                    Err(e) => Err(e),
                }
            }
            AuthMethod::ApiKey => {
                let key = self
                    .prompter
                    .input_secret("Linear API key")
                    .await
                    .ok_or(LctxError::Cancelled)?;
                let key = key.trim();
                if key.is_empty() {
                    return Err(LctxError::Cancelled);
                }

                let client = self.connector.connect(Credential::api_key(key))?;
                // One cheap authenticated call proves the key works
                let viewer = client
                    .viewer()
                    .await
                    .map_err(|e| LctxError::Auth(format!("API key was rejected: {e}")))?;
                self.secrets.store(API_KEY, key).await?;
                tracing::info!(user = %viewer.name, "connected with API key");
                Ok((client, AuthMethod::ApiKey))
            }
        }
    }

    /// Forget the stored API key and drop the client.
    ///
    /// The client is cleared even when deleting the key fails. OAuth grants
    /// are owned by Linear and are not revoked here. Returns `false` only when
    /// the key could not be deleted.
    pub async fn disconnect(&mut self) -> bool {
        self.disconnect_with(false).await
    }

    /// Disconnect, and with `sign_out` also forget the stored OAuth session
    /// so the next restore falls back to the API key (or nothing).
    ///
    /// Returns `false` when any stored credential could not be deleted.
    pub async fn disconnect_with(&mut self, sign_out: bool) -> bool {
        let was_oauth = self.auth_method() == Some(AuthMethod::OAuth);
        self.client = None;
        self.state = SessionState::Unauthenticated;

        let mut cleared = match self.secrets.delete(API_KEY).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to delete stored API key");
                false
            }
        };

        if sign_out {
            if let Err(e) = self.sessions.remove().await {
                tracing::warn!(error = %e, "failed to remove OAuth session");
                cleared = false;
            }
            self.prompter.info(
                "Disconnected from Linear and signed out. The OAuth authorization itself can be revoked in Linear under Settings > Security & access.",
            );
        } else if was_oauth {
            self.prompter.info(
                "Disconnected from Linear. The OAuth authorization stays active; revoke it in Linear under Settings > Security & access if needed.",
            );
        } else {
            self.prompter.info("Disconnected from Linear.");
        }
        cleared
    }

    // Pass-through reads

    pub async fn try_viewer(&self) -> Result<User> {
        self.client()?.viewer().await
    }

    pub async fn viewer(&self) -> Option<User> {
        settle("viewer", self.try_viewer().await)
    }

    pub async fn try_my_issues(&self) -> Result<Vec<Issue>> {
        self.client()?.assigned_issues(self.page_size).await
    }

    pub async fn my_issues(&self) -> Option<Vec<Issue>> {
        settle("my_issues", self.try_my_issues().await)
    }

    pub async fn try_my_teams(&self) -> Result<Vec<Team>> {
        self.client()?.my_teams(self.page_size).await
    }

    pub async fn my_teams(&self) -> Option<Vec<Team>> {
        settle("my_teams", self.try_my_teams().await)
    }

    pub async fn try_workflow_states(&self) -> Result<Vec<WorkflowState>> {
        self.client()?.workflow_states(WORKFLOW_STATES_LIMIT).await
    }

    pub async fn workflow_states(&self) -> Option<Vec<WorkflowState>> {
        settle("workflow_states", self.try_workflow_states().await)
    }

    pub async fn try_available_priorities(&self) -> Result<Vec<PriorityValue>> {
        self.client()?.priority_values().await
    }

    pub async fn available_priorities(&self) -> Option<Vec<PriorityValue>> {
        settle("available_priorities", self.try_available_priorities().await)
    }

    pub async fn try_team_members(&self, team_id: &str) -> Result<Vec<User>> {
        let client = self.client()?;
        require(team_id, "team")?;
        client.team_members(team_id, self.page_size).await
    }

    pub async fn team_members(&self, team_id: &str) -> Option<Vec<User>> {
        settle("team_members", self.try_team_members(team_id).await)
    }

    /// Fetch by human-readable identifier (e.g. ENG-123). `Ok(None)` if missing.
    pub async fn try_issue_by_identifier(&self, identifier: &str) -> Result<Option<Issue>> {
        let client = self.client()?;
        require(identifier, "issue identifier")?;
        client.issue(identifier.trim()).await
    }

    pub async fn issue_by_identifier(&self, identifier: &str) -> Option<Issue> {
        settle(
            "issue_by_identifier",
            self.try_issue_by_identifier(identifier).await,
        )
        .flatten()
    }

    // Context issue

    /// Persist the context issue id. Empty or missing ids are rejected
    /// without touching storage.
    pub async fn set_context_issue_id(&self, id: Option<&str>) -> bool {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            tracing::debug!("refusing to set an empty context issue id");
            return false;
        };

        match self.workspace.update(CONTEXT_ISSUE_KEY, Some(id)).await {
            Ok(()) => {
                tracing::debug!(issue = id, "context issue set");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist context issue id");
                false
            }
        }
    }

    pub async fn try_context_issue_id(&self) -> Result<Option<String>> {
        Ok(self
            .workspace
            .get(CONTEXT_ISSUE_KEY)
            .await?
            .filter(|id| !id.trim().is_empty()))
    }

    pub async fn context_issue_id(&self) -> Option<String> {
        settle("context_issue_id", self.try_context_issue_id().await).flatten()
    }

    /// The context issue, or `Ok(None)` when no context is set or the issue
    /// no longer exists.
    pub async fn try_context_issue(&self) -> Result<Option<Issue>> {
        let Some(id) = self.try_context_issue_id().await? else {
            return Ok(None);
        };
        self.client()?.issue(&id).await
    }

    pub async fn context_issue(&self) -> Option<Issue> {
        settle("context_issue", self.try_context_issue().await).flatten()
    }

    /// The context issue with its related entities.
    ///
    /// The relation fetches run concurrently and are joined all-or-nothing:
    /// if any of them fails the whole bundle fails, and the error names the
    /// failing part via [`LctxError::DetailFetch`].
    pub async fn try_context_issue_details(&self) -> Result<Option<IssueDetails>> {
        let Some(id) = self.try_context_issue_id().await? else {
            return Ok(None);
        };
        let client = self.client()?;

        let Some(issue) = detail_part(DetailPart::Issue, client.issue(&id)).await? else {
            return Ok(None);
        };

        let issue_id = issue.id.as_str();
        let (assignee, creator, team, subscribers, comments) = futures::try_join!(
            detail_part(DetailPart::Assignee, client.issue_assignee(issue_id)),
            detail_part(DetailPart::Creator, client.issue_creator(issue_id)),
            detail_part(DetailPart::Team, client.issue_team(issue_id)),
            detail_part(
                DetailPart::Subscribers,
                client.issue_subscribers(issue_id, DETAIL_FETCH_LIMIT)
            ),
            detail_part(
                DetailPart::Comments,
                client.issue_comments(issue_id, DETAIL_FETCH_LIMIT)
            ),
        )?;

        Ok(Some(IssueDetails {
            issue,
            assignee,
            creator,
            team,
            subscribers,
            comments,
        }))
    }

    pub async fn context_issue_details(&self) -> Option<IssueDetails> {
        match self.try_context_issue_details().await {
            Err(e @ LctxError::DetailFetch { .. }) => {
                tracing::warn!(
                    part = ?e.detail_part(),
                    error = %e,
                    "context issue details unavailable"
                );
                None
            }
            result => settle("context_issue_details", result).flatten(),
        }
    }

    /// Post a comment on the context issue. Returns the remote success flag.
    pub async fn try_add_context_issue_comment(&self, text: &str) -> Result<bool> {
        let client = self.client()?;
        require(text, "comment text")?;
        let id = self
            .try_context_issue_id()
            .await?
            .ok_or(LctxError::NoContextIssue)?;
        client.create_comment(&id, text).await
    }

    pub async fn add_context_issue_comment(&self, text: &str) -> bool {
        settle(
            "add_context_issue_comment",
            self.try_add_context_issue_comment(text).await,
        )
        .unwrap_or(false)
    }

    /// Move the context issue to a workflow state. Returns the remote success flag.
    pub async fn try_set_context_issue_status(&self, state_id: &str) -> Result<bool> {
        let client = self.client()?;
        require(state_id, "workflow state")?;
        let id = self
            .try_context_issue_id()
            .await?
            .ok_or(LctxError::NoContextIssue)?;
        client
            .update_issue(&id, &IssueUpdate::state(state_id.trim()))
            .await
    }

    pub async fn set_context_issue_status(&self, state_id: &str) -> bool {
        settle(
            "set_context_issue_status",
            self.try_set_context_issue_status(state_id).await,
        )
        .unwrap_or(false)
    }

    // Creation

    /// Create an issue. `Ok(None)` when Linear reports the mutation failed.
    pub async fn try_create_issue(&self, issue: &NewIssue) -> Result<Option<CreatedIssue>> {
        let client = self.client()?;
        require(&issue.title, "title")?;
        require(&issue.team_id, "team")?;

        let outcome = client.create_issue(issue).await?;
        if !outcome.success {
            tracing::warn!(title = %issue.title, "Linear reported issue creation as unsuccessful");
            return Ok(None);
        }
        if outcome.issue.is_none() {
            tracing::warn!(title = %issue.title, "issue created but Linear returned no issue");
        }
        Ok(outcome.issue)
    }

    pub async fn create_issue(&self, issue: &NewIssue) -> Option<CreatedIssue> {
        settle("create_issue", self.try_create_issue(issue).await).flatten()
    }

    /// Resolve the full issue behind a creation handle.
    pub async fn resolve_created_issue(&self, created: &CreatedIssue) -> Option<Issue> {
        let result = match self.client() {
            Ok(client) => client.issue(&created.id).await,
            Err(e) => Err(e),
        };
        settle("resolve_created_issue", result).flatten()
    }
}

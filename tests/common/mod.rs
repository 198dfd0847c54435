#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::process::{Command, Output};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use linear_context::auth::{
    AuthMethod, AuthSession, Credential, SessionProvider, StaticSessionProvider,
};
use linear_context::error::{LctxError, Result};
use linear_context::linear::{
    Comment, Connector, CreatedIssue, Issue, IssueCreateOutcome, IssueUpdate, LinearApi, NewIssue,
    PriorityValue, Team, User, WorkflowState,
};
use linear_context::prompt::Prompter;
use linear_context::session::{Collaborators, ContextManager};
use linear_context::storage::{MemorySecretStore, MemoryWorkspaceState, SecretStore};

// Fixtures

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        display_name: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

pub fn team(id: &str, key: &str) -> Team {
    Team {
        id: id.to_string(),
        key: key.to_string(),
        name: format!("{key} team"),
    }
}

pub fn state(id: &str, name: &str, team_id: &str) -> WorkflowState {
    WorkflowState {
        id: id.to_string(),
        name: name.to_string(),
        kind: "unstarted".to_string(),
        color: "#cccccc".to_string(),
        position: 0.0,
        team_id: team_id.to_string(),
        team_key: team_id.to_uppercase(),
    }
}

pub fn issue(id: &str, identifier: &str, title: &str) -> Issue {
    Issue {
        id: id.to_string(),
        identifier: identifier.to_string(),
        title: title.to_string(),
        description: None,
        priority: 0,
        priority_label: "No priority".to_string(),
        estimate: None,
        state: state("state-todo", "Todo", "team-1"),
        url: format!("https://linear.app/acme/issue/{identifier}"),
        branch_name: identifier.to_lowercase(),
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
        updated_at: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

pub fn comment(id: &str, body: &str, author: Option<User>) -> Comment {
    Comment {
        id: id.to_string(),
        body: body.to_string(),
        author,
        created_at: "2024-01-02T00:00:00.000Z".to_string(),
        url: format!("https://linear.app/acme/comment/{id}"),
    }
}

// Mock Linear API

#[derive(Default)]
pub struct MockState {
    /// Every remote call, as `method` or `method:arg`
    pub calls: Vec<String>,
    /// Methods that return an error
    pub failing: HashSet<&'static str>,
    /// `None` makes `viewer` fail like a rejected key
    pub viewer: Option<User>,
    pub issues: Vec<Issue>,
    pub teams: Vec<Team>,
    pub states: Vec<WorkflowState>,
    pub members: HashMap<String, Vec<User>>,
    pub assignees: HashMap<String, User>,
    pub creators: HashMap<String, User>,
    pub issue_teams: HashMap<String, Team>,
    pub subscribers: HashMap<String, Vec<User>>,
    pub comments: HashMap<String, Vec<Comment>>,
    pub create_outcome: Option<IssueCreateOutcome>,
    pub mutation_success: bool,
    pub created: Vec<NewIssue>,
    pub updates: Vec<(String, IssueUpdate)>,
    pub posted_comments: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct MockApi {
    pub state: Arc<Mutex<MockState>>,
}

impl MockApi {
    pub fn new() -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock();
            state.viewer = Some(user("user-1", "Ada"));
            state.mutation_success = true;
        }
        api
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn fail(&self, method: &'static str) {
        self.state.lock().failing.insert(method);
    }

    pub fn add_issue(&self, issue: Issue) {
        self.state.lock().issues.push(issue);
    }

    fn record(&self, method: &'static str, arg: Option<&str>) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(match arg {
            Some(arg) => format!("{method}:{arg}"),
            None => method.to_string(),
        });
        if state.failing.contains(method) {
            return Err(LctxError::Api(format!("{method} failed")));
        }
        Ok(())
    }
}

impl LinearApi for MockApi {
    async fn viewer(&self) -> Result<User> {
        self.record("viewer", None)?;
        self.state
            .lock()
            .viewer
            .clone()
            .ok_or_else(|| LctxError::Auth("invalid credential".to_string()))
    }

    async fn assigned_issues(&self, _first: u32) -> Result<Vec<Issue>> {
        self.record("assigned_issues", None)?;
        Ok(self.state.lock().issues.clone())
    }

    async fn my_teams(&self, _first: u32) -> Result<Vec<Team>> {
        self.record("my_teams", None)?;
        Ok(self.state.lock().teams.clone())
    }

    async fn team_members(&self, team_id: &str, _first: u32) -> Result<Vec<User>> {
        self.record("team_members", Some(team_id))?;
        Ok(self
            .state
            .lock()
            .members
            .get(team_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn workflow_states(&self, _first: u32) -> Result<Vec<WorkflowState>> {
        self.record("workflow_states", None)?;
        Ok(self.state.lock().states.clone())
    }

    async fn priority_values(&self) -> Result<Vec<PriorityValue>> {
        self.record("priority_values", None)?;
        Ok((0..=4)
            .map(|priority| PriorityValue {
                priority,
                label: format!("P{priority}"),
            })
            .collect())
    }

    async fn issue(&self, id: &str) -> Result<Option<Issue>> {
        self.record("issue", Some(id))?;
        Ok(self
            .state
            .lock()
            .issues
            .iter()
            .find(|i| i.id == id || i.identifier == id)
            .cloned())
    }

    async fn issue_assignee(&self, issue_id: &str) -> Result<Option<User>> {
        self.record("issue_assignee", Some(issue_id))?;
        Ok(self.state.lock().assignees.get(issue_id).cloned())
    }

    async fn issue_creator(&self, issue_id: &str) -> Result<Option<User>> {
        self.record("issue_creator", Some(issue_id))?;
        Ok(self.state.lock().creators.get(issue_id).cloned())
    }

    async fn issue_team(&self, issue_id: &str) -> Result<Option<Team>> {
        self.record("issue_team", Some(issue_id))?;
        Ok(self.state.lock().issue_teams.get(issue_id).cloned())
    }

    async fn issue_subscribers(&self, issue_id: &str, _first: u32) -> Result<Vec<User>> {
        self.record("issue_subscribers", Some(issue_id))?;
        Ok(self
            .state
            .lock()
            .subscribers
            .get(issue_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn issue_comments(&self, issue_id: &str, _first: u32) -> Result<Vec<Comment>> {
        self.record("issue_comments", Some(issue_id))?;
        Ok(self
            .state
            .lock()
            .comments
            .get(issue_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<IssueCreateOutcome> {
        self.record("create_issue", Some(&issue.title))?;
        let mut state = self.state.lock();
        state.created.push(issue.clone());
        Ok(state.create_outcome.clone().unwrap_or(IssueCreateOutcome {
            success: false,
            issue: None,
        }))
    }

    async fn update_issue(&self, issue_id: &str, update: &IssueUpdate) -> Result<bool> {
        self.record("update_issue", Some(issue_id))?;
        let mut state = self.state.lock();
        state.updates.push((issue_id.to_string(), update.clone()));
        Ok(state.mutation_success)
    }

    async fn create_comment(&self, issue_id: &str, body: &str) -> Result<bool> {
        self.record("create_comment", Some(issue_id))?;
        let mut state = self.state.lock();
        state
            .posted_comments
            .push((issue_id.to_string(), body.to_string()));
        Ok(state.mutation_success)
    }
}

pub fn created(id: &str, identifier: &str) -> CreatedIssue {
    CreatedIssue {
        id: id.to_string(),
        identifier: identifier.to_string(),
        url: format!("https://linear.app/acme/issue/{identifier}"),
    }
}

/// Hands out the shared [`MockApi`] and records each credential it sees.
#[derive(Clone, Default)]
pub struct MockConnector {
    pub api: MockApi,
    pub credentials: Arc<Mutex<Vec<(AuthMethod, String)>>>,
}

impl MockConnector {
    pub fn connects(&self) -> Vec<(AuthMethod, String)> {
        self.credentials.lock().clone()
    }
}

impl Connector for MockConnector {
    type Client = MockApi;

    fn connect(&self, credential: Credential) -> Result<MockApi> {
        self.credentials
            .lock()
            .push((credential.method(), credential.authorization_value()));
        Ok(self.api.clone())
    }
}

// Collaborators

/// Answers prompts from queues; an exhausted queue dismisses the prompt.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub picks: Mutex<VecDeque<Option<usize>>>,
    pub secrets: Mutex<VecDeque<Option<String>>>,
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn pick(&self, choice: Option<usize>) {
        self.picks.lock().push_back(choice);
    }

    pub fn secret(&self, value: Option<&str>) {
        self.secrets.lock().push_back(value.map(str::to_string));
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn pick(&self, _title: &str, _items: &[String]) -> Option<usize> {
        self.picks.lock().pop_front().flatten()
    }

    async fn input_secret(&self, _prompt: &str) -> Option<String> {
        self.secrets.lock().pop_front().flatten()
    }

    fn info(&self, message: &str) {
        self.infos.lock().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

/// Secret store whose key lookups work but deletes fail.
pub struct FailingSecretStore {
    pub inner: MemorySecretStore,
}

#[async_trait]
impl SecretStore for FailingSecretStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        self.inner.store(key, value).await
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(LctxError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "secret store is read-only",
        )))
    }
}

/// Session provider whose lookups and removals always error.
pub struct BrokenSessionProvider;

#[async_trait]
impl SessionProvider for BrokenSessionProvider {
    async fn session(&self, _scopes: &[String]) -> Result<Option<AuthSession>> {
        Err(LctxError::Auth("keychain unavailable".to_string()))
    }

    async fn session_or_create(&self, _scopes: &[String]) -> Result<Option<AuthSession>> {
        Err(LctxError::Auth("keychain unavailable".to_string()))
    }

    async fn remove(&self) -> Result<()> {
        Err(LctxError::Auth("keychain unavailable".to_string()))
    }
}

/// A manager wired to in-memory collaborators that tests can inspect.
pub struct Harness {
    pub connector: MockConnector,
    pub sessions: Arc<dyn SessionProvider>,
    pub secrets: Arc<dyn SecretStore>,
    pub workspace: Arc<MemoryWorkspaceState>,
    pub prompter: Arc<ScriptedPrompter>,
}

impl Harness {
    /// No OAuth session and no stored API key.
    pub fn new() -> Self {
        Self {
            connector: MockConnector {
                api: MockApi::new(),
                ..Default::default()
            },
            sessions: Arc::new(StaticSessionProvider::default()),
            secrets: Arc::new(MemorySecretStore::default()),
            workspace: Arc::new(MemoryWorkspaceState::default()),
            prompter: Arc::new(ScriptedPrompter::default()),
        }
    }

    pub fn with_oauth(mut self, token: &str) -> Self {
        self.sessions = Arc::new(StaticSessionProvider::new(Some(token), &["read", "write"]));
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.secrets = Arc::new(MemorySecretStore::with_value("apiKey", key));
        self
    }

    pub fn api(&self) -> &MockApi {
        &self.connector.api
    }

    pub fn manager(&self) -> ContextManager<MockConnector> {
        ContextManager::new(
            self.connector.clone(),
            Collaborators {
                sessions: self.sessions.clone(),
                secrets: self.secrets.clone(),
                workspace: self.workspace.clone(),
                prompter: self.prompter.clone(),
            },
        )
    }

    /// A manager restored from the harness's stored credentials.
    pub async fn connected(&self) -> ContextManager<MockConnector> {
        let mut manager = self.manager();
        assert!(manager.initialize().await, "expected stored credentials");
        manager
    }
}

// CLI

/// Runs the `lctx` binary with config and workspace state in a temp directory
pub struct LctxTest {
    pub temp_dir: TempDir,
    api_key: Option<String>,
    rust_log: Option<String>,
}

impl LctxTest {
    pub fn new() -> Self {
        LctxTest {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            api_key: None,
            rust_log: None,
        }
    }

    /// Supply an API key through `LINEAR_API_KEY`
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Run with `RUST_LOG` set
    pub fn with_rust_log(mut self, filter: &str) -> Self {
        self.rust_log = Some(filter.to_string());
        self
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let root = self.temp_dir.path();
        let mut command = Command::new(env!("CARGO_BIN_EXE_lctx"));
        command
            .args(args)
            .current_dir(root)
            .env("LCTX_CONFIG_DIR", root.join("config"))
            .env("LCTX_WORKSPACE", root)
            .env_remove("LINEAR_API_KEY")
            .env_remove("RUST_LOG");
        if let Some(key) = &self.api_key {
            command.env("LINEAR_API_KEY", key);
        }
        if let Some(filter) = &self.rust_log {
            command.env("RUST_LOG", filter);
        }
        command.output().expect("Failed to execute lctx command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}

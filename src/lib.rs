pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod linear;
pub mod logging;
pub mod paths;
pub mod prompt;
pub mod session;
pub mod storage;

pub use auth::{AuthMethod, AuthSession, Credential, SessionProvider};
pub use config::Config;
pub use error::{DetailPart, LctxError, Result};
pub use linear::{
    Comment, Connector, CreatedIssue, Issue, IssueDetails, LinearApi, NewIssue, Team, User,
    WorkflowState,
};
pub use prompt::Prompter;
pub use session::{Collaborators, ContextManager, SessionState};
pub use storage::{SecretStore, WorkspaceState};

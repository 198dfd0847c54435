use std::fmt;

use thiserror::Error;

/// Sub-fetch of an issue detail bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPart {
    Issue,
    Assignee,
    Creator,
    Team,
    Subscribers,
    Comments,
}

impl fmt::Display for DetailPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetailPart::Issue => "issue",
            DetailPart::Assignee => "assignee",
            DetailPart::Creator => "creator",
            DetailPart::Team => "team",
            DetailPart::Subscribers => "subscribers",
            DetailPart::Comments => "comments",
        };
        f.write_str(name)
    }
}

/// A single error entry from a GraphQL response.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQlError {
    pub message: String,
    pub code: Option<String>,
    pub path: Option<String>,
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.message)?,
            None => write!(f, "{}", self.message)?,
        }
        if let Some(path) = &self.path {
            write!(f, " (at {path})")?;
        }
        Ok(())
    }
}

fn join_graphql_errors(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum LctxError {
    #[error("not connected to Linear (run `lctx connect`)")]
    NotAuthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("cancelled")]
    Cancelled,

    #[error("no context issue set (run `lctx context set <issue>`)")]
    NoContextIssue,

    #[error("issue '{0}' not found")]
    IssueNotFound(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("GraphQL error: {}", join_graphql_errors(.errors))]
    GraphQlErrors {
        errors: Vec<GraphQlError>,
    },

    #[error("failed to fetch {part} of the context issue: {source}")]
    DetailFetch {
        part: DetailPart,
        #[source]
        source: Box<LctxError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl LctxError {
    /// True when a GraphQL response reported the requested entity as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            LctxError::GraphQlErrors { errors } => errors.iter().any(|e| {
                e.code.as_deref() == Some("NOT_FOUND")
                    || e.message.to_lowercase().contains("not found")
            }),
            LctxError::IssueNotFound(_) => true,
            _ => false,
        }
    }

    /// Which sub-fetch of a detail bundle failed, if this error came from one.
    pub fn detail_part(&self) -> Option<DetailPart> {
        match self {
            LctxError::DetailFetch { part, .. } => Some(*part),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LctxError>;

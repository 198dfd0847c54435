//! Credentials and the OAuth session provider.
//!
//! Two ways to authenticate against Linear exist: an OAuth access token owned
//! by a [`SessionProvider`], and a personal API key kept in the secret store.
//! When both are present the OAuth session always wins; the API key is only
//! consulted as a fallback (see [`crate::session::ContextManager::initialize`]).

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::OAuthConfig;
use crate::error::{LctxError, Result};
use crate::prompt::Prompter;

const LINEAR_AUTHORIZE_URL: &str = "https://linear.app/oauth/authorize";

/// How a session was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    OAuth,
    ApiKey,
}

impl AuthMethod {
    /// Order in which methods are offered by `connect`.
    pub const ALL: [AuthMethod; 2] = [AuthMethod::OAuth, AuthMethod::ApiKey];

    pub fn label(&self) -> &'static str {
        match self {
            AuthMethod::OAuth => "Sign in with Linear (OAuth)",
            AuthMethod::ApiKey => "Use a personal API key",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::OAuth => write!(f, "oauth"),
            AuthMethod::ApiKey => write!(f, "api-key"),
        }
    }
}

impl std::str::FromStr for AuthMethod {
    type Err = LctxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "oauth" => Ok(AuthMethod::OAuth),
            "api-key" | "apikey" | "api_key" | "key" => Ok(AuthMethod::ApiKey),
            _ => Err(LctxError::Validation(format!(
                "unknown auth method '{s}', expected 'oauth' or 'api-key'"
            ))),
        }
    }
}

/// Secret material used to authenticate API requests.
pub enum Credential {
    OAuth(SecretBox<String>),
    ApiKey(SecretBox<String>),
}

impl Credential {
    pub fn oauth(token: &str) -> Self {
        Credential::OAuth(SecretBox::new(Box::new(token.to_string())))
    }

    pub fn api_key(key: &str) -> Self {
        Credential::ApiKey(SecretBox::new(Box::new(key.to_string())))
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            Credential::OAuth(_) => AuthMethod::OAuth,
            Credential::ApiKey(_) => AuthMethod::ApiKey,
        }
    }

    /// Value for the `Authorization` header. Linear expects OAuth tokens as
    /// bearer tokens and personal API keys verbatim.
    pub fn authorization_value(&self) -> String {
        match self {
            Credential::OAuth(token) => format!("Bearer {}", token.expose_secret()),
            Credential::ApiKey(key) => key.expose_secret().clone(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential")
            .field(&self.method())
            .field(&"[REDACTED]")
            .finish()
    }
}

/// An OAuth session held by the credential provider.
pub struct AuthSession {
    pub access_token: SecretBox<String>,
    pub scopes: Vec<String>,
}

impl AuthSession {
    pub fn credential(&self) -> Credential {
        Credential::oauth(self.access_token.expose_secret())
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Owner of OAuth sessions.
///
/// Sessions live outside this crate's control: disconnecting never revokes
/// them, it only stops using them.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Existing session covering `scopes`, without prompting.
    async fn session(&self, scopes: &[String]) -> Result<Option<AuthSession>>;

    /// Existing session, or interactively create one. `Ok(None)` if the user
    /// backed out.
    async fn session_or_create(&self, scopes: &[String]) -> Result<Option<AuthSession>>;

    /// Sign out: forget the stored session. A no-op when there is none.
    async fn remove(&self) -> Result<()>;
}

/// A provider with a fixed session (or none). Never prompts.
#[derive(Default)]
pub struct StaticSessionProvider {
    token: Mutex<Option<String>>,
    scopes: Vec<String>,
}

impl StaticSessionProvider {
    pub fn new(token: Option<&str>, scopes: &[&str]) -> Self {
        Self {
            token: Mutex::new(token.map(str::to_string)),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matching(&self, scopes: &[String]) -> Option<AuthSession> {
        let token = self.token.lock().clone()?;
        if !scopes.iter().all(|s| self.scopes.contains(s)) {
            return None;
        }
        Some(AuthSession {
            access_token: SecretBox::new(Box::new(token)),
            scopes: self.scopes.clone(),
        })
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn session(&self, scopes: &[String]) -> Result<Option<AuthSession>> {
        Ok(self.matching(scopes))
    }

    async fn session_or_create(&self, scopes: &[String]) -> Result<Option<AuthSession>> {
        Ok(self.matching(scopes))
    }

    async fn remove(&self) -> Result<()> {
        self.token.lock().take();
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    #[serde(default)]
    scopes: Vec<String>,
}

/// OAuth sessions persisted as a token file in the config directory.
///
/// Creating a session points the user at Linear's authorize page (when a
/// client id is configured) and asks for the resulting access token.
pub struct TokenFileSessionProvider {
    path: PathBuf,
    oauth: OAuthConfig,
    prompter: Arc<dyn Prompter>,
}

impl TokenFileSessionProvider {
    pub fn new(path: PathBuf, oauth: OAuthConfig, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            path,
            oauth,
            prompter,
        }
    }

    fn load(&self) -> Result<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let stored: StoredToken = serde_yaml_ng::from_str(&content)?;
        if stored.access_token.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(stored))
    }

    fn save(&self, stored: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml_ng::to_string(stored)?)?;

        // Set restrictive permissions on Unix (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Linear authorize URL for the configured OAuth application.
    pub fn authorize_url(&self, scopes: &[String]) -> Option<Url> {
        let client_id = self.oauth.client_id.as_deref()?;
        let mut url = Url::parse(LINEAR_AUTHORIZE_URL).ok()?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", &self.oauth.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &scopes.join(","))
            .append_pair("actor", "user");
        Some(url)
    }

    fn into_session(stored: StoredToken) -> AuthSession {
        AuthSession {
            access_token: SecretBox::new(Box::new(stored.access_token)),
            scopes: stored.scopes,
        }
    }
}

#[async_trait]
impl SessionProvider for TokenFileSessionProvider {
    async fn session(&self, scopes: &[String]) -> Result<Option<AuthSession>> {
        let Some(stored) = self.load()? else {
            return Ok(None);
        };
        if !scopes.iter().all(|s| stored.scopes.contains(s)) {
            tracing::debug!(
                granted = ?stored.scopes,
                requested = ?scopes,
                "stored OAuth token does not cover the requested scopes"
            );
            return Ok(None);
        }
        Ok(Some(Self::into_session(stored)))
    }

    async fn session_or_create(&self, scopes: &[String]) -> Result<Option<AuthSession>> {
        if let Some(session) = self.session(scopes).await? {
            return Ok(Some(session));
        }

        match self.authorize_url(scopes) {
            Some(url) => self
                .prompter
                .info(&format!("Authorize access in your browser: {url}")),
            None => self.prompter.info(
                "No OAuth client configured (oauth.client_id); paste an access token issued for this workspace.",
            ),
        }

        let Some(token) = self.prompter.input_secret("Linear OAuth access token").await else {
            return Ok(None);
        };
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let stored = StoredToken {
            access_token: token.to_string(),
            scopes: scopes.to_vec(),
        };
        self.save(&stored)?;
        tracing::info!(path = %self.path.display(), "stored OAuth session");
        Ok(Some(Self::into_session(stored)))
    }

    async fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "removed OAuth session");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

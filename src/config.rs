//! Top-level application configuration.
//!
//! Configuration is stored in `<config dir>/config.yaml` and includes:
//! - The Linear GraphQL endpoint and request timeout
//! - Page size for list commands
//! - OAuth application settings and requested scopes

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LctxError, Result};
use crate::paths;

pub const DEFAULT_API_URL: &str = "https://api.linear.app/graphql";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Linear GraphQL endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Number of items fetched by list commands (default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// OAuth application settings
    #[serde(default, skip_serializing_if = "OAuthConfig::is_default")]
    pub oauth: OAuthConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: default_timeout(),
            page_size: default_page_size(),
            oauth: OAuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Client id of the Linear OAuth application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Scopes requested for OAuth sessions (default: read, write)
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_redirect_uri() -> String {
    "http://localhost:8637/callback".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["read".to_string(), "write".to_string()]
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
        }
    }
}

impl OAuthConfig {
    /// Check if this config is the default (for serialization skip)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Keys accepted by `config get` / `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "api_url",
    "timeout",
    "page_size",
    "oauth.client_id",
    "oauth.redirect_uri",
    "oauth.scopes",
];

impl Config {
    /// Load configuration from the default location, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LctxError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&paths::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LctxError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            LctxError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Set restrictive permissions on Unix (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, permissions)?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api_url)
            .map_err(|e| LctxError::Config(format!("invalid api_url '{}': {e}", self.api_url)))?;
        if self.page_size == 0 || self.page_size > 250 {
            return Err(LctxError::Config(format!(
                "page_size must be between 1 and 250, got {}",
                self.page_size
            )));
        }
        if self.timeout == 0 {
            return Err(LctxError::Config(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Read a value by dotted key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "api_url" => Some(self.api_url.clone()),
            "timeout" => Some(self.timeout.to_string()),
            "page_size" => Some(self.page_size.to_string()),
            "oauth.client_id" => self.oauth.client_id.clone(),
            "oauth.redirect_uri" => Some(self.oauth.redirect_uri.clone()),
            "oauth.scopes" => Some(self.oauth.scopes.join(",")),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key, validating it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => self.api_url = value.to_string(),
            "timeout" => self.timeout = parse_number(key, value)?,
            "page_size" => self.page_size = parse_number(key, value)?,
            "oauth.client_id" => {
                self.oauth.client_id = (!value.is_empty()).then(|| value.to_string())
            }
            "oauth.redirect_uri" => self.oauth.redirect_uri = value.to_string(),
            "oauth.scopes" => {
                self.oauth.scopes = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            _ => return Err(unknown_key(key)),
        }
        self.validate()
    }
}

fn unknown_key(key: &str) -> LctxError {
    LctxError::Config(format!(
        "unknown config key '{key}', expected one of: {}",
        CONFIG_KEYS.join(", ")
    ))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| LctxError::Config(format!("{key} must be a number, got '{value}'")))
}

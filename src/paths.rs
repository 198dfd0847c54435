use std::path::PathBuf;

use crate::error::{LctxError, Result};

/// Overrides the per-user configuration directory.
pub const CONFIG_DIR_ENV: &str = "LCTX_CONFIG_DIR";

/// Overrides the workspace root (defaults to the current directory).
pub const WORKSPACE_ENV: &str = "LCTX_WORKSPACE";

/// Returns the per-user configuration directory.
///
/// Resolution order:
/// 1. `LCTX_CONFIG_DIR` environment variable (if set)
/// 2. The platform config directory for `lctx`
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    directories::ProjectDirs::from("app", "linear-context", "lctx")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| LctxError::Config("could not determine a config directory".to_string()))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.yaml"))
}

pub fn secrets_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("secrets.yaml"))
}

pub fn oauth_token_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("oauth.yaml"))
}

/// Returns the workspace root.
///
/// Resolution order:
/// 1. `LCTX_WORKSPACE` environment variable (if set)
/// 2. Current working directory
pub fn workspace_root() -> PathBuf {
    match std::env::var(WORKSPACE_ENV) {
        Ok(root) if !root.is_empty() => PathBuf::from(root),
        _ => PathBuf::from("."),
    }
}

pub fn workspace_state_path() -> PathBuf {
    workspace_root().join(".lctx").join("state.yaml")
}

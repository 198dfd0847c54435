//! Key/value stores the session layer persists into.
//!
//! - [`SecretStore`]: secure values such as the Linear API key.
//! - [`WorkspaceState`]: per-workspace values that survive restarts, such as
//!   the context issue id.
//!
//! File-backed implementations keep a flat YAML map; the in-memory ones back
//! tests and throwaway sessions.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;

/// Secret-scoped key holding the personal API key.
pub const API_KEY: &str = "apiKey";

/// Workspace-scoped key holding the context issue id.
pub const CONTEXT_ISSUE_KEY: &str = "linearContextIssueId";

/// Environment variable that overrides the stored API key for one run.
pub const API_KEY_ENV: &str = "LINEAR_API_KEY";

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn store(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

#[async_trait]
pub trait WorkspaceState: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    /// `None` removes the key.
    async fn update(&self, key: &str, value: Option<&str>) -> Result<()>;
}

async fn read_map(path: &Path) -> Result<BTreeMap<String, String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(content) => Ok(serde_yaml_ng::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

async fn write_map(path: &Path, map: &BTreeMap<String, String>, private: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_yaml_ng::to_string(map)?).await?;

    // Owner read/write only for secrets
    #[cfg(unix)]
    {
        if private {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    Ok(())
}

/// Secrets in a YAML file readable only by the owner.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(read_map(&self.path).await?.remove(key))
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        let mut map = read_map(&self.path).await?;
        map.insert(key.to_string(), value.to_string());
        write_map(&self.path, &map, true).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut map = read_map(&self.path).await?;
        if map.remove(key).is_some() {
            write_map(&self.path, &map, true).await?;
        }
        Ok(())
    }
}

/// Wraps a secret store so `LINEAR_API_KEY` takes precedence over the stored
/// API key. Writes and deletes go to the inner store.
pub struct EnvSecretStore<S> {
    inner: S,
}

impl<S: SecretStore> EnvSecretStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: SecretStore> SecretStore for EnvSecretStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if key == API_KEY
            && let Ok(value) = std::env::var(API_KEY_ENV)
            && !value.is_empty()
        {
            return Ok(Some(value));
        }
        self.inner.get(key).await
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        self.inner.store(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }
}

/// Workspace state in `<workspace>/.lctx/state.yaml`.
#[derive(Debug, Clone)]
pub struct FileWorkspaceState {
    path: PathBuf,
}

impl FileWorkspaceState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WorkspaceState for FileWorkspaceState {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(read_map(&self.path).await?.remove(key))
    }

    async fn update(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut map = read_map(&self.path).await?;
        match value {
            Some(value) => {
                map.insert(key.to_string(), value.to_string());
            }
            None => {
                map.remove(key);
            }
        }
        write_map(&self.path, &map, false).await
    }
}

#[derive(Debug, Default)]
pub struct MemorySecretStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.values.lock().insert(key.to_string(), value.to_string());
        store
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryWorkspaceState {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl WorkspaceState for MemoryWorkspaceState {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn update(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut values = self.values.lock();
        match value {
            Some(value) => {
                values.insert(key.to_string(), value.to_string());
            }
            None => {
                values.remove(key);
            }
        }
        Ok(())
    }
}

// Core trait definitions for service layer dependency injection
//
// Traits here are the "ports" the launcher talks through: the filesystem, the
// installed-app store and configuration. All of them are Send + Sync so they
// can be shared as Arc<dyn Trait> across tokio tasks.

use super::subscription::InstalledSubscription;
use crate::error::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Filesystem abstraction for file I/O operations
///
/// Usage:
///     let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
///     let content = fs.read_to_string(Path::new("installed/notepad.json")).await?;
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read entire file contents as a UTF-8 string
    async fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write string content to a file (creates or overwrites)
    async fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Remove a file; removing a missing file is not an error
    async fn remove_file(&self, path: &Path) -> Result<()>;

    /// Check if a path exists (file or directory)
    ///
    /// Returns false on permission errors (cannot distinguish from non-existence)
    async fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories (like mkdir -p)
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read directory entries, returning file paths
    async fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Per-user store of installed app identifiers
///
/// Records are keyed hierarchically as namespace / user scope / app id.
/// The store is authoritative: shells never patch their own copy of the
/// installed set, they replace it with whatever `subscribe` yields next.
///
/// Usage:
///     let store: Arc<dyn AppStore> = Arc::new(MemoryAppStore::new(bus));
///     store.install("local", "notepad", InstallMetadata::default()).await?;
///     let mut sub = store.subscribe("local").await?;
///     while let Some(snapshot) = sub.next().await { /* re-render */ }
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppStore: Send + Sync {
    /// Add (or refresh) an installed record
    ///
    /// # Errors
    /// - Invalid user scope or app id
    /// - Write errors
    async fn install(
        &self,
        user_scope: &str,
        app_id: &str,
        metadata: InstallMetadata,
    ) -> Result<InstalledRecord>;

    /// Remove an installed record; uninstalling an absent app succeeds
    async fn uninstall(&self, user_scope: &str, app_id: &str) -> Result<()>;

    /// Current installed set for the user
    async fn list(&self, user_scope: &str) -> Result<InstalledSnapshot>;

    /// Remove every installed record for the user
    async fn clear_all(&self, user_scope: &str) -> Result<()>;

    /// Watch the installed set
    ///
    /// The subscription yields the current snapshot first, then one full
    /// snapshot after every change.
    async fn subscribe(&self, user_scope: &str) -> Result<InstalledSubscription>;
}

/// Configuration service for application settings
///
/// Configuration is loaded once at startup and cached in memory.
///
/// Usage:
///     let config: Arc<dyn ConfigService> = Arc::new(FileConfigService::load()?);
///     let api_key = config.get_api_key()?;
#[cfg_attr(test, automock)]
pub trait ConfigService: Send + Sync {
    /// Get API key for the text-generation endpoint
    ///
    /// # Errors
    /// - API key not configured
    fn get_api_key(&self) -> Result<String>;

    /// Get default model identifier
    fn get_model(&self) -> String;

    /// Get text-generation endpoint base URL
    fn get_api_base(&self) -> String;

    /// Root directory of the file store
    fn get_data_dir(&self) -> PathBuf;

    /// Application namespace (first segment of every store key)
    fn get_namespace(&self) -> String;

    /// User scope the shell operates on
    fn get_user_scope(&self) -> String;

    /// Address the shell listens on
    fn get_bind_addr(&self) -> SocketAddr;

    /// Lifetime of transient notices
    fn get_notice_ttl(&self) -> Duration;

    /// Statically enumerated app manifest files
    fn get_manifest_paths(&self) -> Vec<PathBuf>;
}

/// Display metadata copied onto an installed record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallMetadata {
    pub display_name: String,
    pub icon: String,
    pub color: String,
}

/// One persisted "installed" record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledRecord {
    pub installed_at: chrono::DateTime<chrono::Utc>,
    pub display_name: String,
    pub icon: String,
    pub color: String,
    pub app_id: String,
}

impl InstalledRecord {
    pub fn new(app_id: &str, metadata: InstallMetadata) -> Self {
        Self {
            installed_at: chrono::Utc::now(),
            display_name: metadata.display_name,
            icon: metadata.icon,
            color: metadata.color,
            app_id: app_id.to_string(),
        }
    }
}

/// The complete installed set of one user at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledSnapshot {
    pub user_scope: String,
    pub records: Vec<InstalledRecord>,
}

impl InstalledSnapshot {
    /// Build a snapshot ordered by install time, then app id
    pub fn new(user_scope: impl Into<String>, mut records: Vec<InstalledRecord>) -> Self {
        records.sort_by(|a, b| {
            a.installed_at
                .cmp(&b.installed_at)
                .then_with(|| a.app_id.cmp(&b.app_id))
        });
        Self {
            user_scope: user_scope.into(),
            records,
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.app_id.clone()).collect()
    }

    pub fn contains(&self, app_id: &str) -> bool {
        self.records.iter().any(|r| r.app_id == app_id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reject key segments that could escape the store's directory layout
pub fn validate_key_segment(kind: &str, segment: &str) -> Result<()> {
    let valid = !segment.is_empty()
        && !segment.starts_with('.')
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(crate::error::LauncherError::PathError(format!(
            "Invalid {}: '{}'",
            kind, segment
        )))
    }
}

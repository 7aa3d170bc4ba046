// File-based installed-app store
//
// Each installed record is one JSON document at
// `<base>/<namespace>/<user>/installed/<app_id>.json`, mirroring the
// namespace / user / app key path of a hosted document store. Listing is a
// directory read; there is no index file to keep in sync.

use super::subscription::{InstalledSubscription, LatestSnapshots};
use super::traits::{
    validate_key_segment, AppStore, FileSystem, InstallMetadata, InstalledRecord,
    InstalledSnapshot,
};
use crate::error::{LauncherError, Result};
use crate::events::{Event, EventBus, EventKind};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// File-backed `AppStore`
///
/// Mutations are serialized by an internal lock so the snapshots published
/// after each change arrive in the order the changes were made.
///
/// Usage:
///     let fs = Arc::new(RealFileSystem);
///     let store = FileAppStore::new(fs, PathBuf::from("data"), "matcha-app-os", bus);
///     store.install("local", "notepad", metadata).await?;
pub struct FileAppStore {
    /// Filesystem abstraction for testing
    fs: Arc<dyn FileSystem>,

    /// Root directory of the store
    base_path: PathBuf,

    /// Application namespace, first key segment
    namespace: String,

    /// Snapshots are published here after every change
    event_bus: Arc<EventBus>,

    /// Per-user latest snapshot, for subscriptions that fall behind the bus
    latest: LatestSnapshots,

    write_lock: Mutex<()>,
}

impl FileAppStore {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        base_path: PathBuf,
        namespace: impl Into<String>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            fs,
            base_path,
            namespace: namespace.into(),
            event_bus,
            latest: LatestSnapshots::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Directory holding one user's installed records
    fn installed_dir(&self, user_scope: &str) -> Result<PathBuf> {
        validate_key_segment("user scope", user_scope)?;
        Ok(self
            .base_path
            .join(&self.namespace)
            .join(user_scope)
            .join("installed"))
    }

    fn record_path(&self, user_scope: &str, app_id: &str) -> Result<PathBuf> {
        validate_key_segment("app id", app_id)?;
        Ok(self.installed_dir(user_scope)?.join(format!("{}.json", app_id)))
    }

    async fn record_paths(&self, user_scope: &str) -> Result<Vec<PathBuf>> {
        let dir = self.installed_dir(user_scope)?;
        if !self.fs.exists(&dir).await {
            return Ok(Vec::new());
        }

        let paths = self.fs.read_dir(&dir).await.map_err(|e| {
            LauncherError::StoreError(format!("Failed to list installed apps: {}", e))
        })?;

        Ok(paths
            .into_iter()
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect())
    }

    async fn publish_snapshot(&self, user_scope: &str) -> Result<()> {
        let snapshot = self.list(user_scope).await?;
        self.latest.record(&snapshot);
        self.event_bus.emit(Event::new(
            "file_store",
            user_scope,
            EventKind::InstalledChanged(snapshot),
        ));
        Ok(())
    }
}

#[async_trait]
impl AppStore for FileAppStore {
    async fn install(
        &self,
        user_scope: &str,
        app_id: &str,
        metadata: InstallMetadata,
    ) -> Result<InstalledRecord> {
        let _guard = self.write_lock.lock().await;

        let dir = self.installed_dir(user_scope)?;
        let path = self.record_path(user_scope, app_id)?;
        let record = InstalledRecord::new(app_id, metadata);

        let content = serde_json::to_string_pretty(&record).map_err(|e| {
            LauncherError::StoreError(format!("Failed to serialize installed record: {}", e))
        })?;

        if !self.fs.exists(&dir).await {
            self.fs.create_dir_all(&dir).await?;
        }
        self.fs
            .write(&path, &content)
            .await
            .map_err(|e| LauncherError::StoreError(format!("Failed to install '{}': {}", app_id, e)))?;

        tracing::info!("Installed '{}' for '{}'", app_id, user_scope);
        self.publish_snapshot(user_scope).await?;
        Ok(record)
    }

    async fn uninstall(&self, user_scope: &str, app_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let path = self.record_path(user_scope, app_id)?;
        self.fs.remove_file(&path).await.map_err(|e| {
            LauncherError::StoreError(format!("Failed to uninstall '{}': {}", app_id, e))
        })?;

        tracing::info!("Uninstalled '{}' for '{}'", app_id, user_scope);
        self.publish_snapshot(user_scope).await
    }

    async fn list(&self, user_scope: &str) -> Result<InstalledSnapshot> {
        let mut records = Vec::new();

        for path in self.record_paths(user_scope).await? {
            let content = match self.fs.read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping unreadable installed record {:?}: {}", path, e);
                    continue;
                }
            };
            match serde_json::from_str::<InstalledRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping unreadable installed record {:?}: {}", path, e);
                }
            }
        }

        Ok(InstalledSnapshot::new(user_scope, records))
    }

    async fn clear_all(&self, user_scope: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        for path in self.record_paths(user_scope).await? {
            self.fs.remove_file(&path).await.map_err(|e| {
                LauncherError::StoreError(format!("Failed to clear installed apps: {}", e))
            })?;
        }

        tracing::info!("Cleared installed apps for '{}'", user_scope);
        self.publish_snapshot(user_scope).await
    }

    async fn subscribe(&self, user_scope: &str) -> Result<InstalledSubscription> {
        // Held so no mutation lands between the listing and the watch
        let _guard = self.write_lock.lock().await;

        let rx = self.event_bus.subscribe();
        let initial = self.list(user_scope).await?;
        let latest = self.latest.watch(&initial);
        Ok(InstalledSubscription::new(user_scope, initial, rx, latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::traits::MockFileSystem;
    use crate::services::RealFileSystem;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> FileAppStore {
        FileAppStore::new(
            Arc::new(RealFileSystem),
            temp_dir.path().to_path_buf(),
            "matcha-app-os",
            Arc::new(EventBus::new()),
        )
    }

    fn metadata(name: &str) -> InstallMetadata {
        InstallMetadata {
            display_name: name.to_string(),
            icon: "📝".to_string(),
            color: "bg-yellow-100".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_empty_when_nothing_installed() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let snapshot = store.list("local").await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.user_scope, "local");
    }

    #[tokio::test]
    async fn test_install_writes_hierarchical_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let record = store.install("local", "notepad", metadata("Notepad")).await.unwrap();
        assert_eq!(record.app_id, "notepad");

        let path = temp_dir
            .path()
            .join("matcha-app-os")
            .join("local")
            .join("installed")
            .join("notepad.json");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["appId"], "notepad");
        assert_eq!(json["displayName"], "Notepad");
        assert!(json.get("installedAt").is_some());
    }

    #[tokio::test]
    async fn test_install_uninstall_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        store.install("local", "notepad", metadata("Notepad")).await.unwrap();
        store.install("local", "meal_planner", metadata("Meal")).await.unwrap();
        store.install("other", "notepad", metadata("Notepad")).await.unwrap();

        let mut ids = store.list("local").await.unwrap().ids();
        ids.sort();
        assert_eq!(ids, vec!["meal_planner", "notepad"]);

        store.uninstall("local", "notepad").await.unwrap();
        assert_eq!(store.list("local").await.unwrap().ids(), vec!["meal_planner"]);

        // Absent app: still fine
        store.uninstall("local", "notepad").await.unwrap();

        store.clear_all("local").await.unwrap();
        assert!(store.list("local").await.unwrap().is_empty());

        // Other users untouched
        assert_eq!(store.list("other").await.unwrap().ids(), vec!["notepad"]);
    }

    #[tokio::test]
    async fn test_subscription_sees_each_change() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let mut sub = store.subscribe("local").await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        store.install("local", "notepad", metadata("Notepad")).await.unwrap();
        assert_eq!(sub.next().await.unwrap().ids(), vec!["notepad"]);

        store.uninstall("local", "notepad").await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_record_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store.install("local", "notepad", metadata("Notepad")).await.unwrap();

        let broken = temp_dir
            .path()
            .join("matcha-app-os/local/installed/broken.json");
        std::fs::write(broken, "{ not json").unwrap();

        assert_eq!(store.list("local").await.unwrap().ids(), vec!["notepad"]);
    }

    #[tokio::test]
    async fn test_non_utf8_record_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        let dir = temp_dir.path().join("matcha-app-os/local/installed");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bad.json"), [0xff, 0xfe, 0x00]).unwrap();

        assert!(store.list("local").await.unwrap().is_empty());

        let mut sub = store.subscribe("local").await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        let record = store.install("local", "meal_planner", metadata("Meal")).await;
        assert!(record.is_ok());
        assert_eq!(sub.next().await.unwrap().ids(), vec!["meal_planner"]);
        assert_eq!(store.list("local").await.unwrap().ids(), vec!["meal_planner"]);
    }

    #[tokio::test]
    async fn test_invalid_app_id_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let result = store.install("local", "../escape", metadata("x")).await;
        assert!(matches!(result, Err(LauncherError::PathError(_))));
    }

    #[tokio::test]
    async fn test_write_failure_is_store_error() {
        let mut fs = MockFileSystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_write().returning(|_, _| {
            Err(LauncherError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )))
        });

        let store = FileAppStore::new(
            Arc::new(fs),
            PathBuf::from("/data"),
            "matcha-app-os",
            Arc::new(EventBus::new()),
        );

        let result = store.install("local", "notepad", metadata("Notepad")).await;
        match result {
            Err(LauncherError::StoreError(msg)) => assert!(msg.contains("permission denied")),
            other => panic!("Expected StoreError, got {:?}", other),
        }
    }
}

// Shell-side view of the installed set
//
// The only writer is the watcher task fed by the store subscription. Every
// snapshot replaces the previous one wholesale; nothing is merged.

use crate::services::{InstalledSnapshot, InstalledSubscription};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct InstalledApps {
    tx: Arc<watch::Sender<InstalledSnapshot>>,
}

impl InstalledApps {
    /// Empty until the first snapshot arrives
    pub fn new(user_scope: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(InstalledSnapshot::new(user_scope, Vec::new()));
        Self { tx: Arc::new(tx) }
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> InstalledSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every replacement
    pub fn changes(&self) -> watch::Receiver<InstalledSnapshot> {
        self.tx.subscribe()
    }

    /// Spawn the task that keeps this view in sync with `subscription`
    ///
    /// The task ends when the store's event bus closes.
    pub fn spawn_watcher(&self, mut subscription: InstalledSubscription) -> JoinHandle<()> {
        let tx = Arc::clone(&self.tx);
        tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                tracing::debug!(
                    "Installed set for '{}' now has {} apps",
                    snapshot.user_scope,
                    snapshot.records.len()
                );
                tx.send_replace(snapshot);
            }
            tracing::debug!("Installed-set watcher for '{}' stopped", subscription.user_scope());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::services::{AppStore, InstallMetadata, MemoryAppStore};
    use std::time::Duration;

    async fn next_ids(rx: &mut watch::Receiver<InstalledSnapshot>) -> Vec<String> {
        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .unwrap()
            .unwrap();
        let ids = rx.borrow_and_update().ids();
        ids
    }

    #[tokio::test]
    async fn test_view_follows_snapshots_without_stale_entries() {
        let store = MemoryAppStore::new(Arc::new(EventBus::new()));
        store.install("local", "stale", InstallMetadata::default()).await.unwrap();
        store.uninstall("local", "stale").await.unwrap();

        let installed = InstalledApps::new("local");
        let mut rx = installed.changes();
        let _watcher = installed.spawn_watcher(store.subscribe("local").await.unwrap());

        // Initial snapshot
        assert!(next_ids(&mut rx).await.is_empty());

        store.install("local", "x", InstallMetadata::default()).await.unwrap();
        assert_eq!(next_ids(&mut rx).await, vec!["x"]);

        store.install("local", "y", InstallMetadata::default()).await.unwrap();
        assert_eq!(next_ids(&mut rx).await, vec!["x", "y"]);
        assert_eq!(installed.snapshot().ids(), vec!["x", "y"]);
    }

    #[test]
    fn test_starts_empty() {
        let installed = InstalledApps::new("local");
        assert!(installed.snapshot().is_empty());
        assert_eq!(installed.snapshot().user_scope, "local");
    }
}

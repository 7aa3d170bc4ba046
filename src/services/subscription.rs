// Installed-set subscription built on the event bus
//
// Stores publish an `InstalledChanged` event carrying the full snapshot after
// every mutation. A subscription filters those events down to one user scope.
// The bus is shared with notices and action status, so a slow reader can lag;
// the store also keeps the latest snapshot per user in a watch channel and a
// lagged subscription resyncs from it.

use super::traits::InstalledSnapshot;
use crate::events::{Event, EventKind};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::{broadcast, watch};

/// Latest published snapshot per user scope
#[derive(Default)]
pub(crate) struct LatestSnapshots {
    senders: Mutex<HashMap<String, watch::Sender<InstalledSnapshot>>>,
}

impl LatestSnapshots {
    /// Record `snapshot` as current for its user scope
    pub(crate) fn record(&self, snapshot: &InstalledSnapshot) {
        self.watch(snapshot);
    }

    /// Record `snapshot` and return a receiver that tracks later ones
    pub(crate) fn watch(&self, snapshot: &InstalledSnapshot) -> watch::Receiver<InstalledSnapshot> {
        let mut senders = self.senders.lock().unwrap_or_else(|e| e.into_inner());
        match senders.get(&snapshot.user_scope) {
            Some(tx) => {
                tx.send_replace(snapshot.clone());
                tx.subscribe()
            }
            None => {
                let (tx, rx) = watch::channel(snapshot.clone());
                senders.insert(snapshot.user_scope.clone(), tx);
                rx
            }
        }
    }
}

/// Stream of authoritative installed-set snapshots for one user
pub struct InstalledSubscription {
    user_scope: String,
    initial: Option<InstalledSnapshot>,
    rx: broadcast::Receiver<Event>,
    latest: watch::Receiver<InstalledSnapshot>,
}

impl InstalledSubscription {
    /// `rx` must be subscribed before `initial` is read so no change falls
    /// between the two.
    pub fn new(
        user_scope: impl Into<String>,
        initial: InstalledSnapshot,
        rx: broadcast::Receiver<Event>,
        latest: watch::Receiver<InstalledSnapshot>,
    ) -> Self {
        Self {
            user_scope: user_scope.into(),
            initial: Some(initial),
            rx,
            latest,
        }
    }

    pub fn user_scope(&self) -> &str {
        &self.user_scope
    }

    /// Next snapshot, or None once the store's bus is gone
    pub async fn next(&mut self) -> Option<InstalledSnapshot> {
        if let Some(snapshot) = self.initial.take() {
            return Some(snapshot);
        }

        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if !event.is_for(&self.user_scope) {
                        continue;
                    }
                    if let EventKind::InstalledChanged(snapshot) = event.kind {
                        if snapshot.user_scope == self.user_scope {
                            return Some(snapshot);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "Installed subscription for '{}' lagged by {} events, resyncing",
                        self.user_scope,
                        skipped
                    );
                    let snapshot = self.latest.borrow_and_update().clone();
                    return Some(snapshot);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, BROADCAST};
    use crate::notice::Notice;

    fn subscription(bus: &EventBus, latest: &LatestSnapshots) -> InstalledSubscription {
        let initial = InstalledSnapshot::new("alice", vec![]);
        InstalledSubscription::new("alice", initial.clone(), bus.subscribe(), latest.watch(&initial))
    }

    #[tokio::test]
    async fn test_initial_snapshot_first_then_filtered_changes() {
        let bus = EventBus::new();
        let mut sub = subscription(&bus, &LatestSnapshots::default());

        bus.emit(Event::new("store", BROADCAST, EventKind::Notice(Notice::info("noise"))));
        bus.emit(Event::new(
            "store",
            "bob",
            EventKind::InstalledChanged(InstalledSnapshot::new("bob", vec![])),
        ));
        bus.emit(Event::new(
            "store",
            "alice",
            EventKind::InstalledChanged(InstalledSnapshot::new("alice", vec![])),
        ));

        let first = sub.next().await.unwrap();
        assert_eq!(first.user_scope, "alice");

        let second = sub.next().await.unwrap();
        assert_eq!(second.user_scope, "alice");
    }

    #[tokio::test]
    async fn test_closed_bus_ends_subscription() {
        let bus = EventBus::new();
        let mut sub = subscription(&bus, &LatestSnapshots::default());
        drop(bus);

        assert!(sub.next().await.is_some());
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscription_resyncs_to_latest() {
        use crate::services::traits::{InstallMetadata, InstalledRecord};

        let bus = EventBus::with_capacity(8);
        let latest = LatestSnapshots::default();
        let mut sub = subscription(&bus, &latest);
        assert!(sub.next().await.unwrap().is_empty());

        let snapshot = InstalledSnapshot::new(
            "alice",
            vec![InstalledRecord::new("x", InstallMetadata::default())],
        );
        latest.record(&snapshot);
        bus.emit(Event::new("store", "alice", EventKind::InstalledChanged(snapshot)));
        for i in 0..20 {
            bus.emit(Event::new(
                "shell",
                BROADCAST,
                EventKind::Notice(Notice::info(format!("noise {}", i))),
            ));
        }

        let resynced = tokio::time::timeout(std::time::Duration::from_secs(1), sub.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resynced.ids(), vec!["x"]);
    }

    #[test]
    fn test_latest_snapshots_track_each_user() {
        let latest = LatestSnapshots::default();
        let rx = latest.watch(&InstalledSnapshot::new("alice", vec![]));

        latest.record(&InstalledSnapshot::new("bob", vec![]));
        assert_eq!(rx.borrow().user_scope, "alice");

        latest.record(&InstalledSnapshot::new("alice", vec![]));
        assert!(rx.has_changed().unwrap());
    }
}

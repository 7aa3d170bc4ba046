// In-memory installed-app store
//
// Same contract as FileAppStore without persistence. Used for ephemeral
// shells (`MATCHA_DATA_DIR=:memory:`) and throughout the tests.

use super::subscription::{InstalledSubscription, LatestSnapshots};
use super::traits::{
    validate_key_segment, AppStore, InstallMetadata, InstalledRecord, InstalledSnapshot,
};
use crate::error::Result;
use crate::events::{Event, EventBus, EventKind};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct MemoryAppStore {
    /// user scope -> app id -> record
    users: Mutex<HashMap<String, BTreeMap<String, InstalledRecord>>>,
    event_bus: Arc<EventBus>,
    latest: LatestSnapshots,
}

impl MemoryAppStore {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            event_bus,
            latest: LatestSnapshots::default(),
        }
    }

    fn snapshot_of(
        users: &HashMap<String, BTreeMap<String, InstalledRecord>>,
        user_scope: &str,
    ) -> InstalledSnapshot {
        let records = users
            .get(user_scope)
            .map(|apps| apps.values().cloned().collect())
            .unwrap_or_default();
        InstalledSnapshot::new(user_scope, records)
    }

    fn publish(&self, snapshot: InstalledSnapshot) {
        self.latest.record(&snapshot);
        let user_scope = snapshot.user_scope.clone();
        self.event_bus.emit(Event::new(
            "memory_store",
            user_scope,
            EventKind::InstalledChanged(snapshot),
        ));
    }
}

#[async_trait]
impl AppStore for MemoryAppStore {
    async fn install(
        &self,
        user_scope: &str,
        app_id: &str,
        metadata: InstallMetadata,
    ) -> Result<InstalledRecord> {
        validate_key_segment("user scope", user_scope)?;
        validate_key_segment("app id", app_id)?;

        let mut users = self.users.lock().await;
        let record = InstalledRecord::new(app_id, metadata);
        users
            .entry(user_scope.to_string())
            .or_default()
            .insert(app_id.to_string(), record.clone());

        // Published under the lock so snapshots keep mutation order
        self.publish(Self::snapshot_of(&users, user_scope));
        Ok(record)
    }

    async fn uninstall(&self, user_scope: &str, app_id: &str) -> Result<()> {
        validate_key_segment("user scope", user_scope)?;
        validate_key_segment("app id", app_id)?;

        let mut users = self.users.lock().await;
        if let Some(apps) = users.get_mut(user_scope) {
            apps.remove(app_id);
        }
        self.publish(Self::snapshot_of(&users, user_scope));
        Ok(())
    }

    async fn list(&self, user_scope: &str) -> Result<InstalledSnapshot> {
        validate_key_segment("user scope", user_scope)?;
        let users = self.users.lock().await;
        Ok(Self::snapshot_of(&users, user_scope))
    }

    async fn clear_all(&self, user_scope: &str) -> Result<()> {
        validate_key_segment("user scope", user_scope)?;

        let mut users = self.users.lock().await;
        users.remove(user_scope);
        self.publish(Self::snapshot_of(&users, user_scope));
        Ok(())
    }

    async fn subscribe(&self, user_scope: &str) -> Result<InstalledSubscription> {
        validate_key_segment("user scope", user_scope)?;

        let users = self.users.lock().await;
        let rx = self.event_bus.subscribe();
        let initial = Self::snapshot_of(&users, user_scope);
        let latest = self.latest.watch(&initial);
        Ok(InstalledSubscription::new(user_scope, initial, rx, latest))
    }
}

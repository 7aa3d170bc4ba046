// API layer for programmatic access to all launcher functionality
//
// Every shell operation has an equivalent method here; the HTTP shell is a
// thin layer over `LauncherApi`. Failures are converted to transient notices
// at this boundary and also returned to the caller.

use crate::apps::action::apply_report;
use crate::apps::{ActionInput, ActionReport, ActionRunner, AppDescriptor, AppRegistry, Fragment};
use crate::error::{LauncherError, Result};
use crate::events::{Event, EventBus, EventKind, BROADCAST};
use crate::notice::{Notice, NoticeBoard};
use crate::services::{AppStore, InstalledRecord, InstalledSnapshot, InstalledSubscription};
use std::sync::Arc;
use std::time::Duration;

/// One store tile: an app and whether the user has it installed
#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub app: Arc<AppDescriptor>,
    pub installed: bool,
}

/// Rendered fragment after an action, plus what happened
#[derive(Debug, Clone)]
pub struct ActionResponse {
    pub fragment: Fragment,
    pub report: ActionReport,
}

/// Core API for launcher functionality
pub struct LauncherApi {
    registry: Arc<AppRegistry>,
    store: Arc<dyn AppStore>,
    runner: ActionRunner,
    notices: NoticeBoard,
    event_bus: Arc<EventBus>,
    user_scope: String,
}

impl LauncherApi {
    pub fn new(
        registry: Arc<AppRegistry>,
        store: Arc<dyn AppStore>,
        event_bus: Arc<EventBus>,
        user_scope: impl Into<String>,
        notice_ttl: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            runner: ActionRunner::new(Arc::clone(&event_bus)),
            notices: NoticeBoard::new(notice_ttl),
            event_bus,
            user_scope: user_scope.into(),
        }
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    pub fn user_scope(&self) -> &str {
        &self.user_scope
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Post a transient notice and broadcast it
    pub fn notify(&self, notice: Notice) {
        self.event_bus.emit(Event::new(
            "launcher_api",
            BROADCAST,
            EventKind::Notice(notice.clone()),
        ));
        self.notices.post(notice);
    }

    /// Notices that have not expired yet
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.active()
    }

    /// Watch this user's installed set
    pub async fn subscribe_installed(&self) -> Result<InstalledSubscription> {
        self.store.subscribe(&self.user_scope).await
    }

    /// Current installed set straight from the store
    pub async fn installed_snapshot(&self) -> Result<InstalledSnapshot> {
        self.store.list(&self.user_scope).await
    }

    /// Installed apps known to the registry, in snapshot order
    ///
    /// Records for apps the registry does not know are skipped.
    pub fn installed_apps(&self, snapshot: &InstalledSnapshot) -> Vec<Arc<AppDescriptor>> {
        snapshot
            .records
            .iter()
            .filter_map(|record| match self.registry.get(&record.app_id) {
                Ok(app) => Some(app),
                Err(_) => {
                    tracing::debug!("Installed app '{}' is not registered", record.app_id);
                    None
                }
            })
            .collect()
    }

    /// Every registered app with its install state
    pub fn store_listing(&self, snapshot: &InstalledSnapshot) -> Vec<StoreEntry> {
        self.registry
            .all()
            .into_iter()
            .map(|app| StoreEntry {
                installed: snapshot.contains(&app.id),
                app,
            })
            .collect()
    }

    /// Install a registered app for the current user
    ///
    /// # Errors
    /// - `AppNotFound` when the id is not registered
    /// - `StoreError` / `PathError` from the store
    pub async fn install(&self, app_id: &str) -> Result<InstalledRecord> {
        let result = match self.registry.get(app_id) {
            Ok(app) => self
                .store
                .install(&self.user_scope, app_id, app.install_metadata())
                .await
                .map(|record| (record, app.name.clone())),
            Err(e) => Err(e),
        };

        match result {
            Ok((record, name)) => {
                self.notify(Notice::success(format!("Installed {}!", name)));
                Ok(record)
            }
            Err(e) => {
                tracing::warn!("Install of '{}' failed: {}", app_id, e);
                self.notify(Notice::error(format!("Could not install: {}", e)));
                Err(e)
            }
        }
    }

    /// Remove an app from the current user's installed set
    ///
    /// Unknown ids are passed through so stale records can be removed.
    pub async fn uninstall(&self, app_id: &str) -> Result<()> {
        match self.store.uninstall(&self.user_scope, app_id).await {
            Ok(()) => {
                let name = self
                    .registry
                    .get(app_id)
                    .map(|app| app.name.clone())
                    .unwrap_or_else(|_| app_id.to_string());
                self.notify(Notice::info(format!("Uninstalled {}.", name)));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Uninstall of '{}' failed: {}", app_id, e);
                self.notify(Notice::error(format!("Could not uninstall: {}", e)));
                Err(e)
            }
        }
    }

    /// Empty the current user's installed set
    pub async fn clear_all(&self) -> Result<()> {
        match self.store.clear_all(&self.user_scope).await {
            Ok(()) => {
                self.notify(Notice::info("All apps were uninstalled."));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Clear-all failed: {}", e);
                self.notify(Notice::error(format!("Could not clear apps: {}", e)));
                Err(e)
            }
        }
    }

    /// Render an app's main view and run its launch hook
    pub fn launch(&self, app_id: &str) -> Result<(Arc<AppDescriptor>, Fragment)> {
        let app = self.registry.get(app_id).map_err(|e| {
            self.notify(Notice::error(format!("Could not open app: {}", e)));
            e
        })?;

        let fragment = app.render();
        app.launched();
        tracing::debug!("Launched '{}'", app.id);
        Ok((app, fragment))
    }

    /// Dispatch `(app_id, action)` with the submitted fields
    ///
    /// The report's notice (if any) is posted; rejected dispatches post an
    /// error notice and return the error.
    pub async fn invoke_action(
        &self,
        app_id: &str,
        action: &str,
        input: ActionInput,
    ) -> Result<ActionResponse> {
        let outcome = match self.registry.get(app_id) {
            Ok(app) => self
                .runner
                .invoke(&app, action, input)
                .await
                .map(|report| (app, report)),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((app, report)) => {
                if let Some(notice) = &report.notice {
                    self.notify(notice.clone());
                }
                Ok(ActionResponse {
                    fragment: apply_report(&app, &report),
                    report,
                })
            }
            Err(e) => {
                let message = match &e {
                    LauncherError::ActionBusy { .. } => "Still working on it, please wait!".to_string(),
                    other => other.to_string(),
                };
                self.notify(Notice::warning(message));
                Err(e)
            }
        }
    }

    /// True while `(app_id, action)` is running
    pub fn is_busy(&self, app_id: &str, action: &str) -> bool {
        self.runner.is_busy(app_id, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{AppContext, AppLoader};
    use crate::notice::NoticeLevel;
    use crate::services::mocks::test_helpers::*;
    use crate::services::MemoryAppStore;

    async fn api_with(store: Arc<dyn AppStore>, llm: crate::llm::MockLlmAdapter) -> LauncherApi {
        let mut registry = AppRegistry::new();
        AppLoader::standard(vec![])
            .bootstrap(&AppContext::new(Arc::new(llm)), &mut registry)
            .await;

        LauncherApi::new(
            Arc::new(registry),
            store,
            Arc::new(EventBus::new()),
            "tester",
            Duration::from_secs(3),
        )
    }

    fn memory_store() -> Arc<dyn AppStore> {
        Arc::new(MemoryAppStore::new(Arc::new(EventBus::new())))
    }

    #[tokio::test]
    async fn test_install_and_listing() {
        let api = api_with(memory_store(), create_answering_llm("ok")).await;

        let record = api.install("meal_planner").await.unwrap();
        assert_eq!(record.icon, "🍱");

        let snapshot = api.installed_snapshot().await.unwrap();
        let installed: Vec<_> = api
            .installed_apps(&snapshot)
            .iter()
            .map(|a| a.id.clone())
            .collect();
        assert_eq!(installed, vec!["meal_planner"]);

        let listing = api.store_listing(&snapshot);
        assert_eq!(listing.len(), 3);
        assert!(listing.iter().any(|e| e.app.id == "meal_planner" && e.installed));
        assert!(listing.iter().any(|e| e.app.id == "notepad" && !e.installed));

        let notices = api.notices();
        assert_eq!(notices.last().unwrap().level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_install_unknown_app() {
        let api = api_with(memory_store(), create_answering_llm("ok")).await;

        let result = api.install("nope").await;
        assert!(matches!(result, Err(LauncherError::AppNotFound(_))));
        assert!(api.installed_snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_error_becomes_notice() {
        let api = api_with(
            Arc::new(create_failing_store("permission denied")),
            create_answering_llm("ok"),
        )
        .await;

        let result = api.install("notepad").await;
        assert!(matches!(result, Err(LauncherError::StoreError(_))));

        let notice = api.notices().pop().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("permission denied"));
    }

    #[tokio::test]
    async fn test_launch_renders_fresh_fragment() {
        let api = api_with(memory_store(), create_answering_llm("ok")).await;

        let (app, fragment) = api.launch("weather_portal").unwrap();
        assert_eq!(app.id, "weather_portal");
        assert!(fragment.as_str().contains("tenki.jp"));

        assert!(matches!(api.launch("missing"), Err(LauncherError::AppNotFound(_))));
    }

    #[tokio::test]
    async fn test_invoke_action_fills_result_region() {
        let api = api_with(memory_store(), create_answering_llm("## Dinner\n\n* curry")).await;

        let response = api
            .invoke_action(
                "meal_planner",
                "generate_plan",
                ActionInput::default().with_field("input", "potatoes"),
            )
            .await
            .unwrap();

        let region = response
            .fragment
            .region(crate::apps::RESULT_REGION)
            .unwrap()
            .to_string();
        assert!(region.contains("<h2>Dinner</h2><ul><li>curry</li></ul>"));
        assert_eq!(
            api.notices().last().unwrap().message,
            "✨ Your meal plan is ready!"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_action_idle() {
        let api = api_with(memory_store(), create_unreachable_llm()).await;

        let response = api
            .invoke_action(
                "notepad",
                "tidy_note",
                ActionInput::default().with_field("input", "milk"),
            )
            .await
            .unwrap();

        assert!(matches!(
            response.report.status,
            crate::events::ActionStatus::Errored(_)
        ));
        assert!(!api.is_busy("notepad", "tidy_note"));
        assert_eq!(api.notices().last().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_unknown_action_posts_warning() {
        let api = api_with(memory_store(), create_answering_llm("ok")).await;

        let result = api
            .invoke_action("notepad", "explode", ActionInput::default())
            .await;
        assert!(matches!(result, Err(LauncherError::UnknownAction { .. })));
        assert_eq!(api.notices().last().unwrap().level, NoticeLevel::Warning);
    }
}

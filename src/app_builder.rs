// Builder pattern for dependency construction and injection
//
// Production wiring reads configuration, picks the file or in-memory store
// and creates the Gemini adapter. Tests override any piece.
//
// Usage Example:
//     // Production
//     let deps = LauncherBuilder::new()
//         .with_production_deps()?
//         .build()?;
//     let (api, report) = deps.bootstrap().await?;
//
//     // Testing
//     let deps = LauncherBuilder::new()
//         .with_test_deps()
//         .with_llm(Arc::new(mock_llm))
//         .build()?;

use crate::api::LauncherApi;
use crate::apps::{AppContext, AppLoader, AppRegistry, BootstrapReport, DuplicatePolicy};
use crate::error::{LauncherError, Result};
use crate::events::EventBus;
use crate::llm::{GeminiAdapter, LlmAdapter};
use crate::services::config::MEMORY_DATA_DIR;
use crate::services::{
    AppStore, ConfigService, FileAppStore, FileConfigService, FileSystem, MemoryAppStore,
    RealFileSystem,
};
use std::sync::Arc;

/// Builder for the launcher's dependencies
///
/// # Examples
///
/// ```no_run
/// use matcha::LauncherBuilder;
///
/// #[tokio::main]
/// async fn main() -> matcha::Result<()> {
///     let deps = LauncherBuilder::new().with_production_deps()?.build()?;
///     let (api, report) = deps.bootstrap().await?;
///     println!("{} apps loaded", report.loaded.len());
///     Ok(())
/// }
/// ```
pub struct LauncherBuilder {
    config: Option<Arc<dyn ConfigService>>,
    filesystem: Option<Arc<dyn FileSystem>>,
    store: Option<Arc<dyn AppStore>>,
    llm: Option<Arc<dyn LlmAdapter>>,
    event_bus: Option<Arc<EventBus>>,
    policy: DuplicatePolicy,
}

impl LauncherBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            filesystem: None,
            store: None,
            llm: None,
            event_bus: None,
            policy: DuplicatePolicy::default(),
        }
    }

    /// Fill every dependency not already set with its production version
    ///
    /// - FileConfigService from the environment
    /// - FileAppStore on RealFileSystem, or MemoryAppStore for `:memory:`
    /// - GeminiAdapter (a missing API key is logged and left empty)
    ///
    /// # Errors
    /// - Configuration cannot be loaded
    pub fn with_production_deps(mut self) -> Result<Self> {
        let config = match self.config.take() {
            Some(config) => config,
            None => Arc::new(FileConfigService::load()?) as Arc<dyn ConfigService>,
        };

        let event_bus = self
            .event_bus
            .take()
            .unwrap_or_else(|| Arc::new(EventBus::new()));

        let filesystem = self
            .filesystem
            .take()
            .unwrap_or_else(|| Arc::new(RealFileSystem) as Arc<dyn FileSystem>);

        let store = match self.store.take() {
            Some(store) => store,
            None => Self::store_for(config.as_ref(), Arc::clone(&filesystem), Arc::clone(&event_bus)),
        };

        let llm = match self.llm.take() {
            Some(llm) => llm,
            None => Self::llm_for(config.as_ref()),
        };

        self.config = Some(config);
        self.filesystem = Some(filesystem);
        self.store = Some(store);
        self.llm = Some(llm);
        self.event_bus = Some(event_bus);
        Ok(self)
    }

    fn store_for(
        config: &dyn ConfigService,
        filesystem: Arc<dyn FileSystem>,
        event_bus: Arc<EventBus>,
    ) -> Arc<dyn AppStore> {
        let data_dir = config.get_data_dir();
        if data_dir.as_os_str() == MEMORY_DATA_DIR {
            tracing::info!("Using in-memory app store; installs will not persist");
            Arc::new(MemoryAppStore::new(event_bus))
        } else {
            tracing::info!("Using app store at {:?}", data_dir);
            Arc::new(FileAppStore::new(
                filesystem,
                data_dir,
                config.get_namespace(),
                event_bus,
            ))
        }
    }

    fn llm_for(config: &dyn ConfigService) -> Arc<dyn LlmAdapter> {
        let api_key = config.get_api_key().unwrap_or_else(|e| {
            tracing::warn!("{}; AI apps will answer with their fallback text", e);
            String::new()
        });

        Arc::new(
            GeminiAdapter::new(api_key)
                .with_api_base(config.get_api_base())
                .with_model(config.get_model()),
        )
    }

    /// In-memory store, mock config and a fresh bus
    #[cfg(test)]
    pub fn with_test_deps(mut self) -> Self {
        use crate::services::mocks::test_helpers::*;

        let event_bus = Arc::new(EventBus::new());
        self.config = Some(Arc::new(create_mock_config()) as Arc<dyn ConfigService>);
        self.filesystem = Some(Arc::new(create_mock_filesystem()) as Arc<dyn FileSystem>);
        self.store = Some(Arc::new(MemoryAppStore::new(Arc::clone(&event_bus))) as Arc<dyn AppStore>);
        self.event_bus = Some(event_bus);
        self
    }

    /// Override config service (for testing)
    pub fn with_config(mut self, config: Arc<dyn ConfigService>) -> Self {
        self.config = Some(config);
        self
    }

    /// Override filesystem (for testing)
    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.filesystem = Some(fs);
        self
    }

    /// Override the installed-app store
    pub fn with_store(mut self, store: Arc<dyn AppStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the text-generation adapter
    pub fn with_llm(mut self, llm: Arc<dyn LlmAdapter>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Override event bus
    ///
    /// Stores built by this builder publish on it, so set it before
    /// `with_production_deps`.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate that every dependency is present
    ///
    /// # Errors
    /// - `ConfigError` naming the first missing dependency
    pub fn build(self) -> Result<LauncherDependencies> {
        Ok(LauncherDependencies {
            config: self
                .config
                .ok_or_else(|| LauncherError::ConfigError("Config not configured".to_string()))?,
            filesystem: self.filesystem.ok_or_else(|| {
                LauncherError::ConfigError("Filesystem not configured".to_string())
            })?,
            store: self
                .store
                .ok_or_else(|| LauncherError::ConfigError("Store not configured".to_string()))?,
            llm: self
                .llm
                .ok_or_else(|| LauncherError::ConfigError("LLM adapter not configured".to_string()))?,
            event_bus: self
                .event_bus
                .ok_or_else(|| LauncherError::ConfigError("Event bus not configured".to_string()))?,
            policy: self.policy,
        })
    }
}

impl Default for LauncherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all launcher dependencies
pub struct LauncherDependencies {
    pub config: Arc<dyn ConfigService>,
    pub filesystem: Arc<dyn FileSystem>,
    pub store: Arc<dyn AppStore>,
    pub llm: Arc<dyn LlmAdapter>,
    pub event_bus: Arc<EventBus>,
    pub policy: DuplicatePolicy,
}

impl LauncherDependencies {
    /// Load every app source into a fresh registry and build the API
    ///
    /// Sources that fail are reported, not fatal. An empty registry is still
    /// a usable launcher.
    pub async fn bootstrap(&self) -> Result<(LauncherApi, BootstrapReport)> {
        let loader = AppLoader::standard(self.config.get_manifest_paths())
            .with_event_bus(Arc::clone(&self.event_bus));
        let ctx = AppContext::new(Arc::clone(&self.llm));

        let mut registry = AppRegistry::with_policy(self.policy);
        let report = loader.bootstrap(&ctx, &mut registry).await;

        let api = LauncherApi::new(
            Arc::new(registry),
            Arc::clone(&self.store),
            Arc::clone(&self.event_bus),
            self.config.get_user_scope(),
            self.config.get_notice_ttl(),
        );
        Ok((api, report))
    }
}

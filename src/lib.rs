// Library interface for Matcha
// This exposes the launcher as a library that can be:
// - Driven programmatically through LauncherApi
// - Served over HTTP through the shell module
// - Exercised from tests without a browser

pub mod api;
pub mod app_builder;
pub mod apps;
pub mod error;
pub mod events;
pub mod llm;
pub mod markdown;
pub mod notice;
pub mod services;
pub mod shell;
pub mod version;

// Re-export commonly used types for convenience
pub use api::{ActionResponse, LauncherApi, StoreEntry};
pub use app_builder::{LauncherBuilder, LauncherDependencies};
pub use apps::{
    ActionInput, ActionOutcome, ActionReport, ActionRunner, AppAction, AppContext, AppDescriptor,
    AppLoader, AppRegistry, AppSource, BootstrapReport, DuplicatePolicy, Fragment,
};
pub use error::{LauncherError, Result};
pub use events::{ActionStatus, Event, EventBus, EventKind};
pub use llm::{GeminiAdapter, Generation, GenerationRequest, LlmAdapter};
pub use notice::{Notice, NoticeLevel};

pub use services::{
    AppStore, ConfigService, FileAppStore, FileConfigService, FileSystem, InstallMetadata,
    InstalledRecord, InstalledSnapshot, InstalledSubscription, MemoryAppStore, RealFileSystem,
};

// Mini-app framework: descriptors, registry, startup loading and actions
//
// Module Organization:
// - fragment.rs: inert HTML fragments with named regions
// - action.rs: action contract, input/outcome types and the ActionRunner
// - registry.rs: id -> descriptor lookup built once at startup
// - loader.rs: statically enumerated app sources, loaded concurrently
// - manifest.rs: JSON-described prompt apps
// - prompt_app.rs: shared form + text-generation action used by AI apps
// - meal_planner.rs, weather_portal.rs, notepad.rs: built-in apps

pub mod action;
pub mod fragment;
pub mod loader;
pub mod manifest;
pub mod prompt_app;
pub mod registry;

mod meal_planner;
mod notepad;
mod weather_portal;

pub use action::{ActionInput, ActionOutcome, ActionReport, ActionRunner, AppAction};
pub use fragment::{Fragment, RESULT_REGION};
pub use loader::{builtin_sources, AppLoader, AppSource, BootstrapReport, BuiltinSource};
pub use manifest::{AppManifest, ManifestSource};
pub use prompt_app::{PromptAction, PromptAppSpec};
pub use registry::{AppRegistry, DuplicatePolicy};

use crate::llm::LlmAdapter;
use crate::services::InstallMetadata;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Shared collaborators handed to every app source while loading
#[derive(Clone)]
pub struct AppContext {
    pub llm: Arc<dyn LlmAdapter>,
}

impl AppContext {
    pub fn new(llm: Arc<dyn LlmAdapter>) -> Self {
        Self { llm }
    }
}

type RenderFn = Arc<dyn Fn() -> Fragment + Send + Sync>;
type LaunchHook = Arc<dyn Fn() + Send + Sync>;

/// Metadata and behavior of one mini-app
///
/// `render` is invoked fresh on every launch; the fragment it returns holds
/// no references to the app's actions. The shell reaches actions through
/// the `(id, action name)` table carried here.
#[derive(Clone)]
pub struct AppDescriptor {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,

    /// Tile color class used for installed records
    pub color: String,

    render: RenderFn,
    on_launch: Option<LaunchHook>,
    actions: BTreeMap<String, Arc<dyn AppAction>>,
}

impl AppDescriptor {
    pub fn new<F>(id: impl Into<String>, name: impl Into<String>, render: F) -> Self
    where
        F: Fn() -> Fragment + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            description: String::new(),
            color: "bg-gray-100".to_string(),
            render: Arc::new(render),
            on_launch: None,
            actions: BTreeMap::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_on_launch<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_launch = Some(Arc::new(hook));
        self
    }

    pub fn with_action(mut self, name: impl Into<String>, action: Arc<dyn AppAction>) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    /// Produce the app's main view
    pub fn render(&self) -> Fragment {
        (self.render)()
    }

    /// Run the launch hook, if any; call once after the fragment is mounted
    pub fn launched(&self) {
        if let Some(hook) = &self.on_launch {
            hook();
        }
    }

    pub fn has_launch_hook(&self) -> bool {
        self.on_launch.is_some()
    }

    pub fn action(&self, name: &str) -> Option<Arc<dyn AppAction>> {
        self.actions.get(name).cloned()
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    /// Metadata written onto the installed record
    pub fn install_metadata(&self) -> InstallMetadata {
        InstallMetadata {
            display_name: self.name.clone(),
            icon: self.icon.clone(),
            color: self.color.clone(),
        }
    }
}

impl fmt::Debug for AppDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("icon", &self.icon)
            .field("actions", &self.action_names())
            .field("on_launch", &self.on_launch.is_some())
            .finish()
    }
}

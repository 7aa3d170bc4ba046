// Centralized error handling using thiserror for type-safe error management
//
// Every failure the launcher can hit maps to one variant below. Callers at an
// operation boundary (loader, action runner, shell routes) turn these into
// log lines or user-visible notices; nothing propagates to a global handler.

use thiserror::Error;

/// Main error type for the Matcha launcher
///
/// Error Handling Strategy:
/// - IO errors: Automatically converted via #[from] IoError variant
/// - Serde errors: Automatically converted via #[from] SerdeError variant
/// - HTTP errors: Automatically converted via #[from] ReqwestError variant
/// - Application errors: Use specific variants (AppNotFound, StoreError, etc.)
#[derive(Debug, Error)]
pub enum LauncherError {
    /// App with specified ID not found in registry
    #[error("App not found: {0}")]
    AppNotFound(String),

    /// A second descriptor was registered under an existing ID
    /// while the registry rejects duplicates
    #[error("Duplicate app id: {0}")]
    DuplicateApp(String),

    /// App module or manifest could not produce a valid descriptor
    #[error("Load error: {0}")]
    LoadError(String),

    /// User input rejected before any work was started
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The requested action does not exist on the app
    #[error("Unknown action '{action}' for app '{app_id}'")]
    UnknownAction { app_id: String, action: String },

    /// The same action is already running for this app
    #[error("Action '{action}' for app '{app_id}' is already running")]
    ActionBusy { app_id: String, action: String },

    /// Text-generation endpoint error
    ///
    /// Includes non-success HTTP status codes and bodies that are not JSON.
    #[error("LLM error: {0}")]
    LlmError(String),

    /// Installed-app store rejected or failed an operation
    #[error("Store error: {0}")]
    StoreError(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Event bus communication error
    #[error("Event bus error: {0}")]
    EventError(String),

    /// IO operation failed (file, network, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// HTTP request failed
    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// Environment variable not found or invalid
    #[error("Environment error: {0}")]
    EnvError(String),

    /// Directory or path error
    #[error("Path error: {0}")]
    PathError(String),
}

impl LauncherError {
    /// True for failures caused by the text-generation transport
    pub fn is_transport(&self) -> bool {
        matches!(self, LauncherError::LlmError(_) | LauncherError::ReqwestError(_))
    }
}

/// Type alias for Result with LauncherError
pub type Result<T> = std::result::Result<T, LauncherError>;

// Adapters use anyhow internally; their errors surface as LLM errors unless
// the adapter maps them itself.
impl From<anyhow::Error> for LauncherError {
    fn from(err: anyhow::Error) -> Self {
        LauncherError::LlmError(format!("{:#}", err))
    }
}

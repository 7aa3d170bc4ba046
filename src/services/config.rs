// Configuration service implementation
//
// Environment variables (optionally from .env.local / .env via dotenvy) read
// once at startup and cached. Secrets never live in versioned files.

use super::traits::ConfigService;
use crate::error::{LauncherError, Result};
use crate::notice::DEFAULT_NOTICE_TTL;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_NAMESPACE: &str = "matcha-app-os";
pub const DEFAULT_USER_SCOPE: &str = "local";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Sentinel data dir selecting the in-memory store
pub const MEMORY_DATA_DIR: &str = ":memory:";

/// Environment-based configuration service
///
/// Environment Variables:
/// - GEMINI_API_KEY (optional): API key for the text-generation endpoint
/// - GEMINI_MODEL (optional): model, defaults to gemini-2.5-flash-preview-09-2025
/// - GEMINI_API_BASE (optional): endpoint base URL
/// - MATCHA_DATA_DIR (optional): store root, defaults to <data dir>/matcha
/// - MATCHA_NAMESPACE (optional): application namespace, defaults to matcha-app-os
/// - MATCHA_USER (optional): user scope, defaults to local
/// - MATCHA_BIND (optional): shell address, defaults to 127.0.0.1:8080
/// - MATCHA_NOTICE_SECS (optional): notice lifetime, defaults to 3
/// - MATCHA_MANIFESTS (optional): comma-separated app manifest paths
#[derive(Debug, Clone)]
pub struct FileConfigService {
    api_key: Option<String>,
    model: String,
    api_base: String,
    data_dir: PathBuf,
    namespace: String,
    user_scope: String,
    bind_addr: SocketAddr,
    notice_ttl: Duration,
    manifest_paths: Vec<PathBuf>,
}

impl FileConfigService {
    /// Load configuration from the environment
    ///
    /// # Errors
    /// - MATCHA_BIND is not a socket address
    /// - MATCHA_NOTICE_SECS is not a whole number
    /// - No data directory can be determined
    pub fn load() -> Result<Self> {
        // Load .env files (ignore if not found)
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = match var("MATCHA_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|dir| dir.join("matcha"))
                .ok_or_else(|| {
                    LauncherError::PathError(
                        "Could not determine a data directory; set MATCHA_DATA_DIR".to_string(),
                    )
                })?,
        };

        let bind = var("MATCHA_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind.parse::<SocketAddr>().map_err(|e| {
            LauncherError::ConfigError(format!("Invalid MATCHA_BIND '{}': {}", bind, e))
        })?;

        let notice_ttl = match var("MATCHA_NOTICE_SECS") {
            Some(secs) => Duration::from_secs(secs.trim().parse::<u64>().map_err(|e| {
                LauncherError::ConfigError(format!("Invalid MATCHA_NOTICE_SECS '{}': {}", secs, e))
            })?),
            None => DEFAULT_NOTICE_TTL,
        };

        let manifest_paths = var("MATCHA_MANIFESTS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            api_key: var("GEMINI_API_KEY"),
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: var("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            data_dir,
            namespace: var("MATCHA_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            user_scope: var("MATCHA_USER").unwrap_or_else(|| DEFAULT_USER_SCOPE.to_string()),
            bind_addr,
            notice_ttl,
            manifest_paths,
        })
    }

    /// True when the store should live in memory only
    pub fn is_ephemeral(&self) -> bool {
        self.data_dir.as_os_str() == MEMORY_DATA_DIR
    }
}

impl ConfigService for FileConfigService {
    fn get_api_key(&self) -> Result<String> {
        self.api_key.clone().ok_or_else(|| {
            LauncherError::EnvError("GEMINI_API_KEY environment variable not set".to_string())
        })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_api_base(&self) -> String {
        self.api_base.clone()
    }

    fn get_data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn get_namespace(&self) -> String {
        self.namespace.clone()
    }

    fn get_user_scope(&self) -> String {
        self.user_scope.clone()
    }

    fn get_bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    fn get_notice_ttl(&self) -> Duration {
        self.notice_ttl
    }

    fn get_manifest_paths(&self) -> Vec<PathBuf> {
        self.manifest_paths.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            FileConfigService::from_lookup(lookup_from(&[("MATCHA_DATA_DIR", "/tmp/matcha")]))
                .unwrap();

        assert!(config.get_api_key().is_err());
        assert_eq!(config.get_model(), DEFAULT_MODEL);
        assert_eq!(config.get_api_base(), DEFAULT_API_BASE);
        assert_eq!(config.get_data_dir(), PathBuf::from("/tmp/matcha"));
        assert_eq!(config.get_namespace(), "matcha-app-os");
        assert_eq!(config.get_user_scope(), "local");
        assert_eq!(config.get_bind_addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.get_notice_ttl(), Duration::from_secs(3));
        assert!(config.get_manifest_paths().is_empty());
        assert!(!config.is_ephemeral());
    }

    #[test]
    fn test_custom_values() {
        let config = FileConfigService::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "test-key-12345"),
            ("GEMINI_MODEL", "gemini-test"),
            ("MATCHA_DATA_DIR", ":memory:"),
            ("MATCHA_USER", "alice"),
            ("MATCHA_BIND", "0.0.0.0:9000"),
            ("MATCHA_NOTICE_SECS", "5"),
            ("MATCHA_MANIFESTS", "apps/translator.json, apps/haiku.json,"),
        ]))
        .unwrap();

        assert_eq!(config.get_api_key().unwrap(), "test-key-12345");
        assert_eq!(config.get_model(), "gemini-test");
        assert!(config.is_ephemeral());
        assert_eq!(config.get_user_scope(), "alice");
        assert_eq!(config.get_bind_addr().port(), 9000);
        assert_eq!(config.get_notice_ttl(), Duration::from_secs(5));
        assert_eq!(
            config.get_manifest_paths(),
            vec![PathBuf::from("apps/translator.json"), PathBuf::from("apps/haiku.json")]
        );
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = FileConfigService::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "   "),
            ("MATCHA_DATA_DIR", "/tmp/matcha"),
        ]))
        .unwrap();

        match config.get_api_key() {
            Err(LauncherError::EnvError(msg)) => assert!(msg.contains("GEMINI_API_KEY")),
            _ => panic!("Expected EnvError"),
        }
    }

    #[test]
    fn test_invalid_bind_and_ttl() {
        let result = FileConfigService::from_lookup(lookup_from(&[
            ("MATCHA_DATA_DIR", "/tmp/matcha"),
            ("MATCHA_BIND", "not-an-address"),
        ]));
        assert!(matches!(result, Err(LauncherError::ConfigError(_))));

        let result = FileConfigService::from_lookup(lookup_from(&[
            ("MATCHA_DATA_DIR", "/tmp/matcha"),
            ("MATCHA_NOTICE_SECS", "three"),
        ]));
        assert!(matches!(result, Err(LauncherError::ConfigError(_))));
    }
}

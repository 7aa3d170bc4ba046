// Mock test helpers and common mock patterns
//
// Reusable mock constructors with sensible defaults. Tests override specific
// behaviors while inheriting the baseline setup.
//
// Usage:
//     use crate::services::mocks::test_helpers::*;
//     let mut store = create_failing_store("permission denied");
//     let config = create_mock_config();

#[cfg(test)]
pub mod test_helpers {
    use super::super::traits::*;
    use crate::error::LauncherError;
    use crate::llm::{Generation, MockLlmAdapter};
    use std::path::PathBuf;
    use std::time::Duration;

    /// Mock config with in-memory store and test defaults
    ///
    /// Default behavior:
    /// - get_api_key() returns "test-api-key"
    /// - get_model() returns "test-model"
    /// - get_data_dir() returns ":memory:"
    /// - get_user_scope() returns "tester"
    /// - get_manifest_paths() returns no manifests
    pub fn create_mock_config() -> MockConfigService {
        let mut mock = MockConfigService::new();

        mock.expect_get_api_key()
            .returning(|| Ok("test-api-key".to_string()));
        mock.expect_get_model()
            .returning(|| "test-model".to_string());
        mock.expect_get_api_base()
            .returning(|| "http://127.0.0.1:9".to_string());
        mock.expect_get_data_dir()
            .returning(|| PathBuf::from(":memory:"));
        mock.expect_get_namespace()
            .returning(|| "matcha-test".to_string());
        mock.expect_get_user_scope()
            .returning(|| "tester".to_string());
        mock.expect_get_bind_addr()
            .returning(|| "127.0.0.1:0".parse().unwrap());
        mock.expect_get_notice_ttl()
            .returning(|| Duration::from_secs(3));
        mock.expect_get_manifest_paths().returning(Vec::new);

        mock
    }

    /// Mock filesystem with default "nothing exists" behavior
    pub fn create_mock_filesystem() -> MockFileSystem {
        let mut mock = MockFileSystem::new();
        mock.expect_exists().returning(|_| false);
        mock
    }

    /// Store whose every mutation fails with `StoreError(reason)`
    ///
    /// Listing and subscribing are left unconfigured; tests that need them
    /// add their own expectations.
    pub fn create_failing_store(reason: &'static str) -> MockAppStore {
        let mut mock = MockAppStore::new();

        mock.expect_install()
            .returning(move |_, _, _| Err(LauncherError::StoreError(reason.to_string())));
        mock.expect_uninstall()
            .returning(move |_, _| Err(LauncherError::StoreError(reason.to_string())));
        mock.expect_clear_all()
            .returning(move |_| Err(LauncherError::StoreError(reason.to_string())));

        mock
    }

    /// LLM adapter that answers every request with `text`
    pub fn create_answering_llm(text: &'static str) -> MockLlmAdapter {
        let mut mock = MockLlmAdapter::new();
        mock.expect_name().return_const("Mock");
        mock.expect_generate()
            .returning(move |_| Ok(Generation::Text(text.to_string())));
        mock
    }

    /// LLM adapter whose transport always fails
    pub fn create_unreachable_llm() -> MockLlmAdapter {
        let mut mock = MockLlmAdapter::new();
        mock.expect_name().return_const("Mock");
        mock.expect_generate()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        mock
    }
}

#[cfg(test)]
mod tests {
    use super::super::traits::*;
    use super::test_helpers::*;
    use crate::error::LauncherError;

    #[test]
    fn test_create_mock_config() {
        let config = create_mock_config();
        assert_eq!(config.get_user_scope(), "tester");
        assert_eq!(config.get_data_dir().to_str(), Some(":memory:"));
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = create_failing_store("permission denied");
        let result = store
            .install("tester", "notepad", InstallMetadata::default())
            .await;

        match result {
            Err(LauncherError::StoreError(msg)) => assert_eq!(msg, "permission denied"),
            other => panic!("Expected StoreError, got {:?}", other),
        }
    }
}

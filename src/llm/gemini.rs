use super::types::*;
use super::LlmAdapter;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// Adapter for the Gemini `generateContent` endpoint
///
/// Timeouts are left to reqwest's defaults; there is no retry.
pub struct GeminiAdapter {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiAdapter {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_base: GEMINI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Point the adapter at a different endpoint base (proxies, tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }

    async fn send_request(&self, model: &str, request: &ApiRequest) -> Result<reqwest::Response> {
        self.client
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .context("Failed to send request to Gemini")
    }
}

#[async_trait]
impl LlmAdapter for GeminiAdapter {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let api_request = ApiRequest::from(&request);

        let response = self.send_request(&model, &api_request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {}: {}", status, error_text);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Gemini response was not valid JSON")?;

        let generation = Generation::decode(&body);
        if !matches!(generation, Generation::Text(_)) {
            tracing::warn!("Gemini returned no usable text: {:?}", generation);
        }

        Ok(generation)
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_uses_model_and_base() {
        let adapter = GeminiAdapter::new("key".to_string())
            .with_api_base("http://127.0.0.1:9999/v1beta/")
            .with_model("gemini-test");

        assert_eq!(
            adapter.endpoint(&adapter.model),
            "http://127.0.0.1:9999/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_default_endpoint() {
        let adapter = GeminiAdapter::new(String::new());
        assert_eq!(
            adapter.endpoint(DEFAULT_MODEL),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-09-2025:generateContent"
        );
        assert_eq!(adapter.name(), "Gemini");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let adapter = GeminiAdapter::new("key".to_string()).with_api_base("http://127.0.0.1:9");
        let result = adapter.generate(GenerationRequest::new("hi")).await;
        assert!(result.is_err());
    }
}

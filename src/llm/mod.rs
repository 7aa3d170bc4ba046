mod gemini;
mod types;

pub use gemini::GeminiAdapter;
pub use types::*;

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Text-generation interface used by AI-backed app actions
///
/// One request, one response. Transport failures (network, HTTP status,
/// non-JSON body) are errors; a JSON body that lacks the expected text comes
/// back as `Generation::Malformed` or `Generation::Empty` so callers can fail
/// soft.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Issue a single generation request and decode the response
    async fn generate(&self, request: GenerationRequest) -> Result<Generation>;

    /// Get the adapter name for logging/debugging
    fn name(&self) -> &'static str;
}

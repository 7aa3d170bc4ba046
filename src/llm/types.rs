use serde::{Deserialize, Serialize};

/// A single prompt sent to the text-generation endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// User query, already interpolated into the app's template
    pub prompt: String,

    /// Fixed per-app system instruction
    pub system_instruction: Option<String>,

    /// Enable the endpoint's search grounding tool
    pub web_search: bool,

    /// Override the adapter's default model
    pub model: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            web_search: false,
            model: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }
}

/// Decoded result of a generation call
///
/// `Malformed` means a link in `candidates[0].content.parts[0].text` is
/// missing or has the wrong type. `Empty` means the chain is well formed but
/// carries no text (no candidates, or blank text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Text(String),
    Malformed,
    Empty,
}

impl Generation {
    /// Decode an endpoint response body
    pub fn decode(body: &serde_json::Value) -> Self {
        let response: ApiResponse = match serde_json::from_value(body.clone()) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Generation response has unexpected shape: {}", e);
                return Generation::Malformed;
            }
        };

        let Some(candidates) = response.candidates else {
            return Generation::Malformed;
        };
        let Some(candidate) = candidates.into_iter().next() else {
            return Generation::Empty;
        };
        let text = candidate
            .content
            .and_then(|content| content.parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|part| part.text);

        match text {
            Some(text) if text.trim().is_empty() => Generation::Empty,
            Some(text) => Generation::Text(text),
            None => Generation::Malformed,
        }
    }

    /// The generated text, or `fallback` when there is none
    pub fn text_or(self, fallback: &str) -> String {
        match self {
            Generation::Text(text) => text,
            Generation::Malformed | Generation::Empty => fallback.to_string(),
        }
    }
}

// Wire types for the generateContent endpoint

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiRequest {
    pub contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl From<&GenerationRequest> for ApiRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content::text(&request.prompt)],
            tools: request
                .web_search
                .then(|| vec![Tool { google_search: GoogleSearch {} }]),
            system_instruction: request.system_instruction.as_deref().map(Content::text),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
pub(crate) struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

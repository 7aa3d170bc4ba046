// JSON-described prompt apps
//
// A manifest declares a form app backed by the text-generation endpoint
// without writing any Rust:
//
// {
//   "id": "haiku",
//   "name": "Haiku Maker",
//   "icon": "🌸",
//   "systemInstruction": "You write haiku.",
//   "queryTemplate": "Write a haiku about {input}."
// }

use super::loader::AppSource;
use super::prompt_app::{PromptAppSpec, INPUT_PLACEHOLDER};
use super::{AppContext, AppDescriptor};
use crate::services::traits::validate_key_segment;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppManifest {
    /// Registry key; a manifest without one is skipped at load
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,

    #[serde(default = "default_icon")]
    pub icon: String,

    #[serde(default)]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(rename = "systemInstruction")]
    pub system_instruction: String,

    /// Query text containing `{input}`
    #[serde(rename = "queryTemplate")]
    pub query_template: String,

    #[serde(rename = "inputLabel")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(rename = "defaultInput")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_input: Option<String>,

    #[serde(rename = "buttonLabel")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_label: Option<String>,

    #[serde(rename = "webSearch")]
    #[serde(default)]
    pub web_search: bool,
}

fn default_icon() -> String {
    "✨".to_string()
}

impl AppManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse app manifest")
    }

    /// Check the manifest is usable
    ///
    /// # Errors
    /// - Missing or blank `id`, or one the store cannot key records by
    /// - Blank `name`
    /// - `queryTemplate` without `{input}`
    pub fn validate(&self) -> Result<()> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => bail!("Manifest '{}' has no id", self.name),
            Some(id) => validate_key_segment("app id", id).with_context(|| {
                format!("Manifest '{}' has an id that cannot be installed", self.name)
            })?,
        }
        if self.name.trim().is_empty() {
            bail!("Manifest name cannot be empty");
        }
        if !self.query_template.contains(INPUT_PLACEHOLDER) {
            bail!("queryTemplate must contain {}", INPUT_PLACEHOLDER);
        }
        Ok(())
    }

    /// Validate and turn into a registrable descriptor
    pub fn into_descriptor(self, ctx: &AppContext) -> Result<AppDescriptor> {
        self.validate()?;

        let id = self.id.unwrap_or_default().trim().to_string();
        let mut spec = PromptAppSpec::new(id, self.name);
        spec.icon = self.icon;
        spec.description = self.description;
        if let Some(color) = self.color {
            spec.color = color;
        }
        spec.system_instruction = self.system_instruction;
        spec.query_template = self.query_template;
        spec.web_search = self.web_search;
        if let Some(label) = self.input_label {
            spec.input_label = label;
        }
        if let Some(placeholder) = self.placeholder {
            spec.placeholder = placeholder;
        }
        if let Some(default_input) = self.default_input {
            spec.default_input = default_input;
        }
        if let Some(button) = self.button_label {
            spec.button_label = button;
        }

        Ok(spec.into_descriptor(Arc::clone(&ctx.llm)))
    }
}

/// App source reading one manifest file
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AppSource for ManifestSource {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self, ctx: &AppContext) -> Result<AppDescriptor> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read manifest {:?}", self.path))?;

        AppManifest::from_json(&json)
            .and_then(|manifest| manifest.into_descriptor(ctx))
            .with_context(|| format!("Invalid app manifest {:?}", self.path))
    }
}

// Form-to-text-generation apps
//
// Most mini-apps are one text box, one button and a result card: the input is
// interpolated into a query template, sent with a fixed system instruction,
// and the returned Markdown is rendered into the result region.

use super::action::{ActionInput, ActionOutcome, AppAction};
use super::fragment::{region, Fragment, RESULT_REGION};
use super::AppDescriptor;
use crate::error::Result;
use crate::llm::{GenerationRequest, LlmAdapter};
use crate::markdown::{self, escape_html};
use crate::notice::Notice;
use async_trait::async_trait;
use std::sync::Arc;

/// Placeholder replaced by the user's input in a query template
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Form field name carrying the user's input
pub const INPUT_FIELD: &str = "input";

/// Everything needed to build a prompt-backed app
#[derive(Debug, Clone)]
pub struct PromptAppSpec {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub color: String,

    /// Name the button submits; dispatch key of the action
    pub action_name: String,

    pub system_instruction: String,

    /// Query text containing `{input}`
    pub query_template: String,

    /// Enable the endpoint's search grounding tool
    pub web_search: bool,

    pub input_label: String,
    pub placeholder: String,
    pub default_input: String,
    pub button_label: String,

    /// Notice when the input is blank
    pub empty_input_message: String,

    /// Text rendered when the endpoint answers without usable text
    pub fallback: String,

    pub success_message: String,
    pub result_title: String,
    pub result_placeholder: String,
}

impl PromptAppSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: "✨".to_string(),
            description: String::new(),
            color: "bg-gray-100".to_string(),
            action_name: "generate".to_string(),
            system_instruction: String::new(),
            query_template: INPUT_PLACEHOLDER.to_string(),
            web_search: false,
            input_label: "What do you need?".to_string(),
            placeholder: String::new(),
            default_input: String::new(),
            button_label: "Ask the AI".to_string(),
            empty_input_message: "Please enter something first!".to_string(),
            fallback: "Sorry, no answer came back this time...".to_string(),
            success_message: "✨ Your answer is ready!".to_string(),
            result_title: "AI answer".to_string(),
            result_placeholder: "The answer will appear here.".to_string(),
        }
    }

    /// Build the descriptor: form view plus one generation action
    pub fn into_descriptor(self, llm: Arc<dyn LlmAdapter>) -> AppDescriptor {
        let spec = Arc::new(self);
        let view = Arc::clone(&spec);
        let action = PromptAction::new(Arc::clone(&spec), llm);

        AppDescriptor::new(spec.id.clone(), spec.name.clone(), move || render_form(&view))
            .with_icon(spec.icon.clone())
            .with_description(spec.description.clone())
            .with_color(spec.color.clone())
            .with_action(spec.action_name.clone(), Arc::new(action))
    }
}

fn render_form(spec: &PromptAppSpec) -> Fragment {
    let placeholder = region(
        RESULT_REGION,
        &format!(
            "<div class=\"result-placeholder\"><p>{}</p></div>",
            escape_html(&spec.result_placeholder)
        ),
    );

    Fragment::new(format!(
        "<section class=\"app {color}\" data-app=\"{id}\">\
         <h1>{icon} {name}</h1>\
         <form method=\"post\" action=\"/apps/{id}/actions\">\
         <label for=\"{id}-input\">{label}</label>\
         <textarea id=\"{id}-input\" name=\"{field}\" placeholder=\"{placeholder}\">{default}</textarea>\
         <button type=\"submit\" name=\"action\" value=\"{action}\">{button}</button>\
         </form>\
         <div class=\"result\">{result}</div>\
         </section>",
        color = escape_html(&spec.color),
        id = escape_html(&spec.id),
        icon = escape_html(&spec.icon),
        name = escape_html(&spec.name),
        label = escape_html(&spec.input_label),
        field = INPUT_FIELD,
        placeholder = escape_html(&spec.placeholder),
        default = escape_html(&spec.default_input),
        action = escape_html(&spec.action_name),
        button = escape_html(&spec.button_label),
        result = placeholder,
    ))
}

/// The generation action shared by prompt apps
pub struct PromptAction {
    spec: Arc<PromptAppSpec>,
    llm: Arc<dyn LlmAdapter>,
}

impl PromptAction {
    pub fn new(spec: Arc<PromptAppSpec>, llm: Arc<dyn LlmAdapter>) -> Self {
        Self { spec, llm }
    }

    /// Query text sent for `input`
    pub fn query_for(&self, input: &str) -> String {
        self.spec.query_template.replace(INPUT_PLACEHOLDER, input)
    }

    fn request_for(&self, input: &str) -> GenerationRequest {
        let mut request =
            GenerationRequest::new(self.query_for(input)).with_web_search(self.spec.web_search);
        if !self.spec.system_instruction.is_empty() {
            request = request.with_system_instruction(self.spec.system_instruction.clone());
        }
        request
    }

    fn result_card(&self, text: &str) -> String {
        format!(
            "<div class=\"result-card\"><h2>{}</h2><div class=\"markdown-body\">{}</div></div>",
            escape_html(&self.spec.result_title),
            markdown::render(text)
        )
    }
}

#[async_trait]
impl AppAction for PromptAction {
    fn validate(&self, input: &ActionInput) -> Result<()> {
        input
            .require(INPUT_FIELD, &self.spec.empty_input_message)
            .map(|_| ())
    }

    async fn run(&self, input: ActionInput) -> Result<ActionOutcome> {
        let text = input.require(INPUT_FIELD, &self.spec.empty_input_message)?;
        let request = self.request_for(text);

        tracing::debug!("{}: sending generation request via {}", self.spec.id, self.llm.name());
        let generation = self.llm.generate(request).await?;
        let body = generation.text_or(&self.spec.fallback);

        Ok(ActionOutcome::new(self.result_card(&body))
            .with_notice(Notice::success(self.spec.success_message.clone())))
    }
}

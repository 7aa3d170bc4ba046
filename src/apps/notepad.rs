// Notepad: jot something down, get back a tidy Markdown summary

use super::prompt_app::PromptAppSpec;
use super::{AppContext, AppDescriptor};
use std::sync::Arc;

pub const APP_ID: &str = "notepad";
pub const ACTION: &str = "tidy_note";

pub fn build(ctx: &AppContext) -> AppDescriptor {
    let mut spec = PromptAppSpec::new(APP_ID, "Notepad");
    spec.icon = "📝".to_string();
    spec.description = "Scribble a note and let the AI tidy it into a clean summary.".to_string();
    spec.color = "bg-amber-100".to_string();
    spec.action_name = ACTION.to_string();
    spec.system_instruction = "You tidy up rough personal notes. Reply in Markdown with a \
short ### title, a bullet list of the key points, and nothing else."
        .to_string();
    spec.query_template = "Tidy up this note:\n\n{input}".to_string();
    spec.input_label = "Your note".to_string();
    spec.placeholder = "e.g. call dentist, buy milk, finish slides by fri".to_string();
    spec.button_label = "Tidy my note".to_string();
    spec.empty_input_message = "Please write a note!".to_string();
    spec.fallback = "Sorry, I couldn't tidy this note...".to_string();
    spec.success_message = "📝 Your note is tidy!".to_string();
    spec.result_title = "Tidied note".to_string();
    spec.result_placeholder = "Your tidied note will appear here.".to_string();

    spec.into_descriptor(Arc::clone(&ctx.llm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmAdapter;

    #[test]
    fn test_notepad_exposes_tidy_action() {
        let app = build(&AppContext::new(Arc::new(MockLlmAdapter::new())));
        assert_eq!(app.id, "notepad");
        assert!(app.action(ACTION).is_some());
        assert!(!app.has_launch_hook());
    }
}

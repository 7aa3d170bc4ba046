// Meal planner: suggests three meal plans from what is in the fridge

use super::prompt_app::PromptAppSpec;
use super::{AppContext, AppDescriptor};
use std::sync::Arc;

pub const APP_ID: &str = "meal_planner";
pub const ACTION: &str = "generate_plan";

const SYSTEM_INSTRUCTION: &str = "You are a professional meal-planning AI that considers the \
user's health and tastes. Based on the ingredients and wishes the user gives, suggest three \
meal plans that balance nutrition with easy cooking. Answer in Markdown, and every suggestion \
must include an \"Overview\" and \"Extra ingredients\".";

const QUERY_TEMPLATE: &str = "[Ingredients on hand] {input}\n\n[Request] Using the ingredients \
above, suggest three meal plans that respect these constraints.";

const DEFAULT_REQUEST: &str =
    "I have pork, cabbage and eggs. Something quick that kids will enjoy, please!";

pub fn spec() -> PromptAppSpec {
    let mut spec = PromptAppSpec::new(APP_ID, "Meal Planner 🍽️");
    spec.icon = "🍱".to_string();
    spec.description =
        "The AI suggests the best meals from what's in your fridge. What's for dinner tonight?"
            .to_string();
    spec.color = "bg-yellow-100".to_string();
    spec.action_name = ACTION.to_string();
    spec.system_instruction = SYSTEM_INSTRUCTION.to_string();
    spec.query_template = QUERY_TEMPLATE.to_string();
    spec.web_search = true;
    spec.input_label = "Tell me your ingredients and wishes!".to_string();
    spec.placeholder = format!("e.g. {}", DEFAULT_REQUEST);
    spec.default_input = DEFAULT_REQUEST.to_string();
    spec.button_label = "Ask the AI for a meal plan!".to_string();
    spec.empty_input_message = "Please enter your request!".to_string();
    spec.fallback = "Sorry, I couldn't come up with a meal plan this time... 😥".to_string();
    spec.success_message = "✨ Your meal plan is ready!".to_string();
    spec.result_title = "Meal plan from the AI".to_string();
    spec.result_placeholder = "The AI's meal plan will show up here!".to_string();
    spec
}

pub fn build(ctx: &AppContext) -> AppDescriptor {
    spec().into_descriptor(Arc::clone(&ctx.llm))
}

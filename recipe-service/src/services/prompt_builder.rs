//! Prompt construction for recipe generation.
//!
//! The model interface takes a single user turn, so the persona/format
//! instructions and the caller's request are merged into one text.

/// Opening of the user section; the mock provider keys off it too.
pub const REQUEST_PREFIX: &str = "Create a recipe based on this request: ";

const SEPARATOR_WIDTH: usize = 50;

const SYSTEM_PROMPT: &str = r#"You are AutoChef, an expert culinary assistant with extensive knowledge of cooking techniques, flavor combinations, and practical recipe development.

Your role is to create detailed, practical recipes that home cooks can successfully execute. You have expertise in:
- International cuisines and cooking techniques
- Ingredient substitutions and dietary adaptations
- Proper cooking times and temperatures
- Kitchen equipment and cooking methods
- Food safety and preparation best practices

CRITICAL: You must respond with ONLY valid JSON in this exact format:
{
    "title": "Creative, appetizing recipe name",
    "ingredients": [
        {"name": "ingredient name", "quantity": number, "unit": "measurement unit"},
        {"name": "ingredient name", "quantity": number, "unit": "measurement unit"}
    ],
    "instructions": "Clear, step-by-step cooking directions with specific techniques and timing",
    "cookTimeMinutes": number
}

Guidelines for your responses:
- Create practical recipes using common, accessible ingredients
- Provide specific quantities and measurements as plain decimal numbers (0.5, not 1/2)
- Write clear, detailed cooking instructions
- Include realistic cooking times
- Ensure recipes are achievable for home cooks
- Be creative with titles while keeping them descriptive
- Do not include any text outside the JSON response"#;

/// Persona and strict output-format instructions.
pub fn build_system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// The caller's request plus optional dietary and cuisine clauses.
///
/// Blank preference entries are skipped; if none remain, or the cuisine is
/// absent or blank, the matching clause is left out entirely.
pub fn build_user_prompt(
    prompt: &str,
    cuisine: Option<&str>,
    dietary_preferences: &[String],
) -> String {
    let mut user_prompt = format!("{}{}", REQUEST_PREFIX, prompt);

    let preferences = non_blank(dietary_preferences);
    if !preferences.is_empty() {
        user_prompt.push_str("\n\nDietary requirements: ");
        user_prompt.push_str(&preferences.join(", "));
        user_prompt.push_str("\nEnsure the recipe accommodates these dietary needs.");
    }

    if let Some(cuisine) = cuisine.map(str::trim).filter(|c| !c.is_empty()) {
        user_prompt.push_str("\n\nCuisine preference: ");
        user_prompt.push_str(cuisine);
        user_prompt.push_str("\nFocus on this cuisine style in the recipe.");
    }

    user_prompt.push_str(
        "\n\nProvide your response as valid JSON only, following the exact format specified above.",
    );

    user_prompt
}

/// System instructions, a separator line, and the labelled user request.
pub fn build_combined_prompt(
    prompt: &str,
    cuisine: Option<&str>,
    dietary_preferences: &[String],
) -> String {
    let user_prompt = build_user_prompt(prompt, cuisine, dietary_preferences);

    let mut combined = String::with_capacity(SYSTEM_PROMPT.len() + user_prompt.len() + 80);
    combined.push_str(build_system_prompt());
    combined.push_str("\n\n");
    combined.push_str(&"=".repeat(SEPARATOR_WIDTH));
    combined.push('\n');
    combined.push_str("USER REQUEST:\n");
    combined.push_str(&user_prompt);
    combined
}

/// What went into a prompt, for the request log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSummary<'a> {
    pub prompt_chars: usize,
    pub dietary_preferences: Vec<&'a str>,
    pub locale: Option<&'a str>,
}

pub fn summarize<'a>(
    prompt: &str,
    dietary_preferences: &'a [String],
    locale: Option<&'a str>,
) -> PromptSummary<'a> {
    PromptSummary {
        prompt_chars: prompt.chars().count(),
        dietary_preferences: non_blank(dietary_preferences),
        locale: locale.map(str::trim).filter(|l| !l.is_empty()),
    }
}

fn non_blank(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

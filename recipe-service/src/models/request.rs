use serde::Deserialize;

/// Body of `POST /api/v1/generate-recipe`.
///
/// `prompt` is optional at the serde level so that a missing prompt and a
/// blank one are both reported as `INVALID_PROMPT` rather than a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub dietary_preferences: Option<Vec<String>>,

    /// Cuisine hint, e.g. "ITALIAN" or "Thai".
    #[serde(default)]
    pub locale: Option<String>,
}

impl RecipeRequest {
    /// The prompt with surrounding whitespace removed, or `None` when it is
    /// missing or blank.
    pub fn trimmed_prompt(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
    }

    pub fn dietary_preferences(&self) -> &[String] {
        self.dietary_preferences.as_deref().unwrap_or_default()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> RecipeRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn full_request_parses() {
        let request = parse(
            r#"{"prompt":"chicken and garlic","dietaryPreferences":["gluten-free","low-carb"],"locale":"ITALIAN"}"#,
        );

        assert_eq!(request.trimmed_prompt(), Some("chicken and garlic"));
        assert_eq!(request.dietary_preferences(), ["gluten-free", "low-carb"]);
        assert_eq!(request.locale(), Some("ITALIAN"));
    }

    #[test]
    fn optional_fields_may_be_absent_or_null() {
        let request = parse(r#"{"prompt":"soup","dietaryPreferences":null}"#);

        assert!(request.dietary_preferences().is_empty());
        assert_eq!(request.locale(), None);
    }

    #[test]
    fn blank_or_missing_prompt_has_no_trimmed_value() {
        assert_eq!(parse(r#"{"prompt":"   \n\t"}"#).trimmed_prompt(), None);
        assert_eq!(parse(r#"{"prompt":""}"#).trimmed_prompt(), None);
        assert_eq!(parse(r#"{}"#).trimmed_prompt(), None);
    }

    #[test]
    fn prompt_is_trimmed() {
        assert_eq!(parse(r#"{"prompt":"  pasta  "}"#).trimmed_prompt(), Some("pasta"));
    }

    #[test]
    fn preference_count_and_locale_length_are_unbounded() {
        let preferences: Vec<String> = (0..50).map(|i| format!("pref-{}", i)).collect();
        let body = serde_json::json!({
            "prompt": "salad",
            "dietaryPreferences": preferences,
            "locale": "x".repeat(500),
        })
        .to_string();

        let request = parse(&body);

        assert_eq!(request.dietary_preferences().len(), 50);
        assert_eq!(request.locale().map(str::len), Some(500));
    }
}

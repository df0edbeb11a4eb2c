//! Recipe generation: prompt in, validated [`Recipe`] out.

use crate::config::GenerationSettings;
use crate::models::Recipe;
use crate::services::metrics;
use crate::services::normalize::normalize_fractions;
use crate::services::prompt_builder::{build_combined_prompt, summarize};
use crate::services::providers::{GenerationParams, ProviderError, TextProvider};
use serde_json::error::Category;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// How much of a bad reply goes into the log line.
const LOG_PREVIEW_CHARS: usize = 200;

/// The model replied, but not with a usable recipe.
#[derive(Error, Debug)]
pub enum OutputContractError {
    #[error("Model reply is not valid JSON: {source}")]
    InvalidJson {
        source: serde_json::Error,
        raw: String,
        normalized: String,
    },

    #[error("Model reply does not match the recipe schema: {source}")]
    SchemaMismatch {
        source: serde_json::Error,
        raw: String,
    },
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    OutputContract(#[from] OutputContractError),
}

impl GenerationError {
    /// Outcome label for the generation counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            GenerationError::Provider(_) => "provider_error",
            GenerationError::OutputContract(_) => "output_contract_error",
        }
    }
}

/// Builds prompts, calls the model, and turns its reply into a [`Recipe`].
///
/// Holds no per-request state; one instance is shared through `AppState`.
pub struct RecipeGenerator {
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
}

impl RecipeGenerator {
    pub fn new(provider: Arc<dyn TextProvider>, params: GenerationParams) -> Self {
        Self { provider, params }
    }

    pub fn from_settings(provider: Arc<dyn TextProvider>, settings: &GenerationSettings) -> Self {
        Self::new(
            provider,
            GenerationParams {
                max_tokens: settings.max_tokens,
                temperature: settings.temperature,
            },
        )
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Generates one recipe. Nothing is retried: a provider failure or an
    /// unusable reply ends the request.
    pub async fn generate_recipe(
        &self,
        prompt: &str,
        dietary_preferences: &[String],
        locale: Option<&str>,
    ) -> Result<Recipe, GenerationError> {
        let summary = summarize(prompt, dietary_preferences, locale);
        tracing::info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            prompt_chars = summary.prompt_chars,
            dietary_preferences = ?summary.dietary_preferences,
            locale = summary.locale,
            "Generating recipe"
        );

        let full_prompt = build_combined_prompt(prompt, locale, dietary_preferences);

        let start = Instant::now();
        let result = self.provider.generate(&full_prompt, &self.params).await;
        let elapsed = start.elapsed();

        metrics::record_provider_latency(
            self.provider.name(),
            self.provider.model(),
            elapsed.as_secs_f64(),
        );

        let response = result.map_err(|e| {
            metrics::record_provider_error(self.provider.name(), e.kind());
            e
        })?;

        metrics::record_tokens(
            self.provider.model(),
            response.input_tokens,
            response.output_tokens,
        );
        tracing::info!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = response.finish_reason.as_str(),
            latency_ms = elapsed.as_millis() as u64,
            "Model reply received"
        );

        Ok(parse_recipe(&response.text)?)
    }
}

/// Normalizes fraction quantities and parses the reply as a [`Recipe`].
pub fn parse_recipe(raw: &str) -> Result<Recipe, OutputContractError> {
    let normalized = normalize_fractions(raw);

    serde_json::from_str::<Recipe>(&normalized).map_err(|source| {
        if source.classify() == Category::Data {
            tracing::warn!(
                error = %source,
                raw = %preview(raw),
                "Model reply does not match the recipe schema"
            );
            OutputContractError::SchemaMismatch {
                source,
                raw: raw.to_string(),
            }
        } else {
            tracing::warn!(
                error = %source,
                raw = %preview(raw),
                normalized = %preview(&normalized),
                "Model reply is not valid JSON"
            );
            OutputContractError::InvalidJson {
                source,
                raw: raw.to_string(),
                normalized: normalized.into_owned(),
            }
        }
    })
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{FinishReason, ProviderResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const PARAMS: GenerationParams = GenerationParams {
        max_tokens: 1000,
        temperature: 0.3,
    };

    /// Replies with a fixed result and keeps the prompts it was sent.
    struct ScriptedProvider {
        reply: Result<String, fn() -> ProviderError>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: fn() -> ProviderError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextProvider for ScriptedProvider {
        async fn generate(
            &self,
            prompt: &str,
            params: &GenerationParams,
        ) -> Result<ProviderResponse, ProviderError> {
            assert_eq!(*params, PARAMS);
            self.prompts.lock().unwrap().push(prompt.to_string());

            match &self.reply {
                Ok(text) => Ok(ProviderResponse {
                    text: text.clone(),
                    input_tokens: 50,
                    output_tokens: 20,
                    finish_reason: FinishReason::Complete,
                }),
                Err(make) => Err(make()),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    const REPLY: &str = r#"{
        "title": "Lemon Garlic Pasta",
        "ingredients": [
            {"name": "spaghetti", "quantity": 200, "unit": "g"},
            {"name": "lemon", "quantity": 1/2, "unit": "whole"},
            {"name": "garlic", "quantity": 2, "unit": "cloves"}
        ],
        "instructions": "Boil pasta. Toss with lemon and garlic.",
        "cookTimeMinutes": 15
    }"#;

    #[tokio::test]
    async fn successful_reply_becomes_a_recipe() {
        let provider = ScriptedProvider::replying(REPLY);
        let generator = RecipeGenerator::new(provider.clone(), PARAMS);

        let recipe = generator
            .generate_recipe("lemon pasta", &["vegetarian".to_string()], Some("ITALIAN"))
            .await
            .unwrap();

        assert_eq!(recipe.title, "Lemon Garlic Pasta");
        let names: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["spaghetti", "lemon", "garlic"]);
        assert_eq!(recipe.ingredients[1].quantity, Some(0.5));
        assert_eq!(recipe.cook_time_minutes, Some(15));

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Create a recipe based on this request: lemon pasta"));
        assert!(prompts[0].contains("Dietary requirements: vegetarian"));
        assert!(prompts[0].contains("Cuisine preference: ITALIAN"));
    }

    #[tokio::test]
    async fn provider_failure_is_reported_as_such() {
        let provider = ScriptedProvider::failing(|| ProviderError::ApiError {
            code: "AccessDeniedException".to_string(),
            message: "denied".to_string(),
        });
        let generator = RecipeGenerator::new(provider, PARAMS);

        let err = generator.generate_recipe("soup", &[], None).await.unwrap_err();

        assert!(matches!(
            err,
            GenerationError::Provider(ProviderError::ApiError { ref code, .. }) if code == "AccessDeniedException"
        ));
        assert_eq!(err.outcome(), "provider_error");
    }

    #[tokio::test]
    async fn prose_reply_is_an_output_contract_error() {
        let provider = ScriptedProvider::replying("Sure! Here is a lovely soup recipe.");
        let generator = RecipeGenerator::new(provider, PARAMS);

        let err = generator.generate_recipe("soup", &[], None).await.unwrap_err();

        assert!(matches!(
            err,
            GenerationError::OutputContract(OutputContractError::InvalidJson { .. })
        ));
        assert_eq!(err.outcome(), "output_contract_error");
    }

    #[test]
    fn missing_field_is_a_schema_mismatch() {
        let err = parse_recipe(r#"{"title": "Toast", "instructions": "Toast it."}"#).unwrap_err();

        assert!(matches!(err, OutputContractError::SchemaMismatch { .. }));
    }

    #[test]
    fn wrong_type_is_a_schema_mismatch() {
        let err = parse_recipe(
            r#"{"title": "Toast", "ingredients": "bread", "instructions": "Toast it."}"#,
        )
        .unwrap_err();

        assert!(matches!(err, OutputContractError::SchemaMismatch { .. }));
    }

    #[test]
    fn zero_denominator_keeps_the_reply_invalid() {
        let err = parse_recipe(
            r#"{"title": "T", "ingredients": [{"name": "x", "quantity": 1/0}], "instructions": "i"}"#,
        )
        .unwrap_err();

        match err {
            OutputContractError::InvalidJson { normalized, .. } => {
                assert!(normalized.contains("1/0"));
            }
            other => panic!("expected invalid JSON, got {:?}", other),
        }
    }

    #[test]
    fn fraction_followed_by_more_digits_is_rejected_not_misread() {
        for quantity in ["6/2.5", "3/4e2"] {
            let reply = format!(
                r#"{{"title": "T", "ingredients": [{{"name": "x", "quantity": {}}}], "instructions": "i"}}"#,
                quantity
            );

            let err = parse_recipe(&reply).unwrap_err();

            assert!(
                matches!(err, OutputContractError::InvalidJson { .. }),
                "{} should not parse, got {:?}",
                quantity,
                err
            );
        }
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let recipe = parse_recipe(
            r#"{"title": "T", "ingredients": [], "instructions": "i", "servings": 4}"#,
        )
        .unwrap();

        assert!(recipe.ingredients.is_empty());
        assert_eq!(recipe.cook_time_minutes, None);
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let text = "é".repeat(300);

        assert_eq!(preview(&text).chars().count(), LOG_PREVIEW_CHARS);
    }
}

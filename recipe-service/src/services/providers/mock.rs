//! Mock provider for local development without model access.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use crate::services::prompt_builder::REQUEST_PREFIX;
use async_trait::async_trait;
use serde_json::json;

/// Returns a fixed, schema-valid recipe whose title echoes the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProvider;

#[async_trait]
impl TextProvider for MockProvider {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = prompt
            .lines()
            .find_map(|line| line.strip_prefix(REQUEST_PREFIX))
            .unwrap_or("your request");

        let reply = json!({
            "title": format!("Recipe for: {}", request),
            "ingredients": [
                {"name": "Salt", "quantity": 1, "unit": "tsp"}
            ],
            "instructions": "Mix ingredients and cook.",
            "cookTimeMinutes": 10
        });

        Ok(ProviderResponse {
            text: reply.to_string(),
            input_tokens: (prompt.len() / 4) as u32,
            output_tokens: 10,
            finish_reason: FinishReason::Complete,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }
}

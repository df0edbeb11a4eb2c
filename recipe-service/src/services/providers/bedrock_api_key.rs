//! AWS Bedrock provider authenticated with a Bedrock API key.
//!
//! Calls the Converse REST endpoint directly with the key as a bearer token.
//! Used when `AWS_BEARER_TOKEN_BEDROCK` is set; otherwise the SDK-backed
//! [`super::BedrockProvider`] signs requests with the default credential chain.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the AWS error shape, e.g. `ThrottlingException:http://...`.
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Bedrock API key provider configuration.
#[derive(Debug, Clone)]
pub struct BedrockApiKeyConfig {
    pub region: String,
    pub model_id: String,
    pub endpoint: Option<String>,
    pub api_key: Secret<String>,
    pub timeout: Duration,
}

/// Bedrock Converse text provider using bearer-token auth.
pub struct BedrockApiKeyProvider {
    config: BedrockApiKeyConfig,
    endpoint: String,
    client: Client,
}

impl BedrockApiKeyProvider {
    pub fn new(config: BedrockApiKeyConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint(&config.region))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Model ids contain `:` (e.g. `...-v1:0`) and must be path-encoded.
    fn converse_url(&self) -> String {
        format!(
            "{}/model/{}/converse",
            self.endpoint,
            urlencoding::encode(&self.config.model_id)
        )
    }
}

fn default_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{}.amazonaws.com", region)
}

#[async_trait]
impl TextProvider for BedrockApiKeyProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let api_key = self.config.api_key.expose_secret();
        if api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Bedrock API key not configured".to_string(),
            ));
        }

        let request = ConverseRequest {
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![ContentBlock {
                    text: Some(prompt.to_string()),
                }],
            }],
            inference_config: InferenceConfig {
                max_tokens: params.max_tokens,
                temperature: params.temperature,
            },
        };

        tracing::debug!(
            model = %self.config.model_id,
            region = %self.config.region,
            prompt_len = prompt.len(),
            "Sending request to Bedrock Converse API"
        );

        let response = self
            .client
            .post(self.converse_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::NetworkError(format!("Request timed out: {}", e))
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let code = error_code(response.headers(), status);
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited(message));
            }

            return Err(ProviderError::ApiError { code, message });
        }

        let api_response: ConverseResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                code: "InvalidResponse".to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        let finish_reason = finish_reason(api_response.stop_reason.as_deref());
        if finish_reason == FinishReason::ContentFilter {
            return Err(ProviderError::ContentFiltered);
        }

        let usage = api_response.usage.unwrap_or_default();

        // Take the first text block; other block kinds are skipped.
        let text = api_response
            .output
            .and_then(|o| o.message)
            .and_then(|m| m.content.into_iter().find_map(|block| block.text))
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(ProviderResponse {
            text,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            finish_reason,
        })
    }

    fn name(&self) -> &'static str {
        "bedrock"
    }

    fn model(&self) -> &str {
        &self.config.model_id
    }
}

/// AWS error shape from the error-type header (`Name:namespace` → `Name`),
/// falling back to the HTTP status code.
fn error_code(headers: &HeaderMap, status: StatusCode) -> String {
    headers
        .get(ERROR_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(':').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP{}", status.as_u16()))
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "no error body".to_string(),
        Err(_) => body.to_string(),
    }
}

fn finish_reason(stop_reason: Option<&str>) -> FinishReason {
    match stop_reason {
        Some("max_tokens") => FinishReason::Length,
        Some("content_filtered") | Some("guardrail_intervened") => FinishReason::ContentFilter,
        _ => FinishReason::Complete,
    }
}

// ============================================================================
// Converse API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseRequest {
    messages: Vec<Message>,
    inference_config: InferenceConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseResponse {
    #[serde(default)]
    output: Option<ConverseOutput>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ConverseOutput {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TokenUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "Message")]
    message: String,
}
